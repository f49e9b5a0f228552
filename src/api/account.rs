use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::{info, warn};

use crate::{
    api::types::UpdateAccountRequest,
    auth::{
        handlers::{normalize_email, optional, required},
        password::hash_password,
        session::AuthenticatedUser,
    },
    error::{AppError, AppResult},
    model::user::{ContactCard, User, UserProfile},
    state::AppState,
};

const PICTURE_FIELD: &str = "picture";

pub async fn get_account(caller: AuthenticatedUser) -> Json<UserProfile> {
    Json(caller.user.profile())
}

pub async fn update_account(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Json(req): Json<UpdateAccountRequest>,
) -> AppResult<Json<UserProfile>> {
    let mut user = caller.user;

    user.name = required("name", &req.name)?;
    user.email = normalize_email(&req.email)?;
    user.phone = optional(req.phone.as_deref());
    user.address = optional(req.address.as_deref());
    if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        user.password_hash = hash_password(password)?;
    }

    if !state.db.update_user(&user).await? {
        return Err(AppError::invalid("email already registered"));
    }

    info!(user_id = user.id, "profile updated");
    Ok(Json(user.profile()))
}

pub async fn upload_picture(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<UserProfile>> {
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::invalid(format!("Failed to read field: {e}")))?;
        if bytes.is_empty() {
            continue;
        }

        stored = Some(
            state
                .storage
                .save_picture(bytes.as_ref(), file_name.as_deref())
                .await?,
        );
        break;
    }

    let filename = stored.ok_or_else(|| AppError::invalid("No picture found in upload"))?;
    let user = replace_picture(&state, caller.user, filename).await?;
    Ok(Json(user.profile()))
}

/// Points `user` at the freshly stored `filename` and drops the old picture.
/// If the record cannot be written the new file is removed again.
async fn replace_picture(state: &AppState, mut user: User, filename: String) -> AppResult<User> {
    let previous = std::mem::replace(&mut user.image_file, filename);

    let saved = match state.db.update_user(&user).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::invalid("email already registered")),
        Err(err) => Err(err.into()),
    };
    if let Err(err) = saved {
        if let Err(e) = state.storage.remove_picture(&user.image_file).await {
            warn!(error = ?e, file = user.image_file.as_str(), "failed to remove orphaned picture");
        }
        return Err(err);
    }

    if let Err(err) = state.storage.remove_picture(&previous).await {
        warn!(?err, file = previous.as_str(), "failed to remove old picture");
    }

    info!(user_id = user.id, file = user.image_file.as_str(), "profile picture replaced");
    Ok(user)
}

pub async fn contact(caller: AuthenticatedUser) -> Json<ContactCard> {
    Json(caller.user.contact_card())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::tests::test_app, db::tests::new_user};

    #[tokio::test]
    async fn failed_save_removes_the_new_picture() {
        let app = test_app().await;
        let state = &app.state;
        let user = state.db.create_user(new_user("a", "a@x.nl")).await.unwrap().unwrap();
        // gone before the upload finishes
        state.db.delete_user(user.id).await.unwrap();

        let filename = state.storage.save_picture(b"img", Some("me.png")).await.unwrap();
        assert!(state.storage.root().join(&filename).exists());

        let err = replace_picture(state, user, filename.clone()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
        assert!(!state.storage.root().join(&filename).exists());
    }
}
