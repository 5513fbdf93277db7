use crate::error::{GatewayError, Result};
use crate::request::RequestView;
use crate::state::GatewayState;
use auth_identity::{AuthRequest, IdentityError, SearchFilter, User, UserRepository};
use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::info;

/// Log in with `email` and `password` form fields and set the session
/// cookie.
pub async fn login(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    jar: CookieJar,
    form: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<(CookieJar, Json<Value>)> {
    let fields = form.map(|Form(fields)| fields).unwrap_or_default();
    let view = RequestView::from_headers(&headers).with_form(fields);

    let email = required_field(&view, "email")?;
    let password = required_field(&view, "password")?;

    let user = find_by_email(state.users.as_ref(), email)
        .await?
        .ok_or(GatewayError::UserNotFound)?;
    if !user.is_valid_password(password) {
        return Err(GatewayError::WrongPassword);
    }

    let auth = state.auth.as_ref().ok_or(GatewayError::SessionsDisabled)?;
    let session_name = auth
        .session_name()
        .ok_or(GatewayError::SessionsDisabled)?
        .to_string();
    let session_id = auth
        .create_session(&user.id)
        .await?
        .ok_or(GatewayError::SessionsDisabled)?;

    info!(user_id = %user.id, "User logged in");
    let cookie = Cookie::build((session_name, session_id))
        .path("/")
        .http_only(true);

    Ok((jar.add(cookie), Json(user.to_json())))
}

/// End the session named by the request's cookie.
pub async fn logout(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>)> {
    let auth = state.auth.as_ref().ok_or(GatewayError::NotFound)?;
    let view = RequestView::from_headers(&headers);

    if !auth.destroy_session(Some(&view)).await {
        return Err(GatewayError::NotFound);
    }

    let jar = match auth.session_name() {
        Some(name) => jar.remove(Cookie::build(name.to_string()).path("/")),
        None => jar,
    };
    Ok((jar, Json(json!({}))))
}

fn required_field<'a>(view: &'a RequestView, name: &'static str) -> Result<&'a str> {
    view.form_field(name)
        .filter(|value| !value.is_empty())
        .ok_or(GatewayError::MissingField(name))
}

async fn find_by_email(users: &dyn UserRepository, email: &str) -> Result<Option<User>> {
    match users.search(&SearchFilter::eq("email", email)).await {
        Ok(found) => Ok(found.into_iter().next()),
        Err(IdentityError::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
