//! Sign-in and sign-up request bodies.

use crate::capture::Image;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// A verification attempt.
///
/// Carries at most one image: the frame captured for this attempt, or
/// none when face authentication was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigninRequest {
    /// Claimed username.
    pub username: String,
    /// Freshly captured face image, if face authentication is on.
    pub face_image: Option<Image>,
}

impl SigninRequest {
    /// Creates a request without a face image.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            face_image: None,
        }
    }

    /// Attaches a face image.
    pub fn with_face(mut self, image: Image) -> Self {
        self.face_image = Some(image);
        self
    }

    pub(crate) fn payload(&self) -> SigninPayload<'_> {
        SigninPayload {
            username: &self.username,
            image: self.face_image.as_ref(),
        }
    }
}

/// An enrollment attempt with zero or more reference images.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    /// Requested username.
    pub username: String,
    /// Account password. Only exposed when the body is serialized.
    pub password: SecretString,
    /// Enrollment images in capture order.
    pub face_images: Vec<Image>,
}

impl SignupRequest {
    /// Creates a request without enrollment images.
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            face_images: Vec::new(),
        }
    }

    /// Sets the enrollment images.
    pub fn with_images(mut self, images: Vec<Image>) -> Self {
        self.face_images = images;
        self
    }

    pub(crate) fn payload(&self) -> SignupPayload<'_> {
        SignupPayload {
            username: &self.username,
            password: self.password.expose_secret(),
            images: &self.face_images,
        }
    }
}

/// Wire body for `POST /signin`.
#[derive(Serialize)]
pub(crate) struct SigninPayload<'a> {
    username: &'a str,
    image: Option<&'a Image>,
}

/// Wire body for `POST /signup`.
#[derive(Serialize)]
pub(crate) struct SignupPayload<'a> {
    username: &'a str,
    password: &'a str,
    images: &'a [Image],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signin_without_face_serializes_null_image() {
        let request = SigninRequest::new("alice");
        let body = serde_json::to_value(request.payload()).unwrap();
        assert_eq!(body, json!({ "username": "alice", "image": null }));
    }

    #[test]
    fn test_signin_with_face_serializes_data_uri() {
        let request = SigninRequest::new("alice").with_face(Image::jpeg(vec![1, 2, 3]));
        let body = serde_json::to_value(request.payload()).unwrap();
        assert_eq!(
            body,
            json!({ "username": "alice", "image": "data:image/jpeg;base64,AQID" })
        );
    }

    #[test]
    fn test_signup_serializes_images_in_order() {
        let request = SignupRequest::new("bob", SecretString::from("hunter2".to_string()))
            .with_images(vec![Image::jpeg(vec![1]), Image::jpeg(vec![2])]);
        let body = serde_json::to_value(request.payload()).unwrap();
        assert_eq!(
            body,
            json!({
                "username": "bob",
                "password": "hunter2",
                "images": ["data:image/jpeg;base64,AQ==", "data:image/jpeg;base64,Ag=="],
            })
        );
    }

    #[test]
    fn test_signup_empty_images_and_redacted_debug() {
        let request = SignupRequest::new("bob", SecretString::from("hunter2".to_string()));
        let body = serde_json::to_value(request.payload()).unwrap();
        assert_eq!(body["images"], json!([]));
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
