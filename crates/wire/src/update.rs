//! Bodies and header names for the title update endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::VideoType;

/// Header carrying the CSRF token copied from the session cookie.
pub const CSRF_HEADER: &str = "X-CSRFToken";
/// Marker header telling the server to answer JSON instead of redirecting
/// to an HTML page.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";
/// Default cookie name the server stores the CSRF token under.
pub const CSRF_COOKIE: &str = "csrftoken";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostData {
    pub title: String,
    pub url: String,
    pub video_type: VideoType,
}

/// The exact POST body: `{"post_data": {"title", "url", "video_type"}}`,
/// nothing else at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequestBody {
    pub post_data: PostData,
}

/// Fresh title data returned on a successful update. `image_url` is a
/// server-relative path and may be absent when no art was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleUpdate {
    pub rating: String,
    pub blurb: String,
    #[serde(rename = "image-url", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A 200-class update response is either fresh title data or an
/// application-level rejection carried as `{"error": ...}`. Rejection is
/// tried first so a body with an `error` key is never misread as success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateReply {
    Rejected { error: String },
    Updated(TitleUpdate),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn post_body_uses_exact_key_spelling() {
        let body = UpdateRequestBody {
            post_data: PostData {
                title: "Archer".to_string(),
                url: "https://provider.example/title/tt1486217/".to_string(),
                video_type: VideoType::Tv,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "post_data": {
                    "title": "Archer",
                    "url": "https://provider.example/title/tt1486217/",
                    "video_type": "TV",
                }
            })
        );
    }

    #[test]
    fn reply_with_error_key_is_a_rejection() {
        let reply: UpdateReply =
            serde_json::from_value(json!({"error": "No results for 'Archr'"})).unwrap();
        assert_eq!(
            reply,
            UpdateReply::Rejected {
                error: "No results for 'Archr'".to_string()
            }
        );
    }

    #[test]
    fn reply_with_title_data_is_an_update() {
        let reply: UpdateReply = serde_json::from_value(json!({
            "rating": "8.6/10",
            "blurb": "Covert black ops and espionage take a back seat.",
            "image-url": "/media/img/archer.jpg",
        }))
        .unwrap();
        assert_eq!(
            reply,
            UpdateReply::Updated(TitleUpdate {
                rating: "8.6/10".to_string(),
                blurb: "Covert black ops and espionage take a back seat.".to_string(),
                image_url: Some("/media/img/archer.jpg".to_string()),
            })
        );
    }

    #[test]
    fn reply_without_image_url_decodes_to_none() {
        let reply: UpdateReply =
            serde_json::from_value(json!({"rating": "7.1/10", "blurb": "b"})).unwrap();
        match reply {
            UpdateReply::Updated(update) => assert_eq!(update.image_url, None),
            other => panic!("expected update, got {other:?}"),
        }
    }
}
