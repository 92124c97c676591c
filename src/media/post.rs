use super::MediaKind;
use crate::error::{Error, Result};
use crate::uri::Key;

use serde::{Deserialize, Serialize};

/// Most characters in the text of a post.
pub const MAX_CONTENT_CHARS: usize = 5000;
/// Most tracks in a playlist.
pub const MAX_PLAYLIST_TRACKS: usize = 100;

/// A post as submitted by a client, tagged by its `type`.
///
/// ```rust
/// use media_transfer::media::PostRequest;
///
/// let post = PostRequest::from_json(
///     r#"{"type": "image", "userId": "u1", "imageKey": "image/0192/cat.png"}"#,
/// )
/// .unwrap();
///
/// assert_eq!(post.kind(), "image");
/// assert!(post.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum PostRequest {
    /// Text only.
    Text {
        /// Author of the post.
        user_id: String,
        /// Body text, at most [`MAX_CONTENT_CHARS`] characters.
        content: String,
    },
    /// An uploaded image with an optional caption.
    Image {
        /// Author of the post.
        user_id: String,
        /// Optional caption.
        #[serde(default)]
        content: Option<String>,
        /// Key of the uploaded image.
        image_key: Key,
    },
    /// An uploaded audio file with an optional caption.
    Audio {
        /// Author of the post.
        user_id: String,
        /// Optional caption.
        #[serde(default)]
        content: Option<String>,
        /// Key of the uploaded audio file.
        audio_key: Key,
    },
    /// An uploaded video with an optional caption.
    Video {
        /// Author of the post.
        user_id: String,
        /// Optional caption.
        #[serde(default)]
        content: Option<String>,
        /// Key of the uploaded video.
        video_key: Key,
    },
    /// An ordered list of uploaded audio files.
    Playlist {
        /// Author of the post.
        user_id: String,
        /// Playlist title.
        title: String,
        /// Audio keys in play order.
        tracks: Vec<Key>,
    },
}

impl PostRequest {
    /// Decode a post from its JSON body.
    ///
    /// A body that is not a well-formed post is a `Validation` error.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::invalid("body", e.to_string()))
    }

    /// The `type` tag of the post.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Audio { .. } => "audio",
            Self::Video { .. } => "video",
            Self::Playlist { .. } => "playlist",
        }
    }

    /// The author of the post.
    pub fn user_id(&self) -> &str {
        match self {
            Self::Text { user_id, .. }
            | Self::Image { user_id, .. }
            | Self::Audio { user_id, .. }
            | Self::Video { user_id, .. }
            | Self::Playlist { user_id, .. } => user_id,
        }
    }

    /// Every object the post refers to, in order.
    pub fn media_keys(&self) -> Vec<&Key> {
        match self {
            Self::Text { .. } => Vec::new(),
            Self::Image { image_key, .. } => vec![image_key],
            Self::Audio { audio_key, .. } => vec![audio_key],
            Self::Video { video_key, .. } => vec![video_key],
            Self::Playlist { tracks, .. } => tracks.iter().collect(),
        }
    }

    /// Check the shape of the post.
    ///
    /// The author must be set, text is at most 5000 characters, and each
    /// referenced object must live under the prefix of its media kind.
    pub fn validate(&self) -> Result<()> {
        if self.user_id().trim().is_empty() {
            return Err(Error::invalid("userId", "must not be empty"));
        }

        match self {
            Self::Text { content, .. } => {
                if content.trim().is_empty() {
                    return Err(Error::invalid("content", "must not be empty"));
                }
                check_content(content)
            }
            Self::Image {
                content, image_key, ..
            } => {
                check_caption(content.as_deref())?;
                check_key("imageKey", image_key, MediaKind::Image)
            }
            Self::Audio {
                content, audio_key, ..
            } => {
                check_caption(content.as_deref())?;
                check_key("audioKey", audio_key, MediaKind::Audio)
            }
            Self::Video {
                content, video_key, ..
            } => {
                check_caption(content.as_deref())?;
                check_key("videoKey", video_key, MediaKind::Video)
            }
            Self::Playlist { title, tracks, .. } => {
                if title.trim().is_empty() {
                    return Err(Error::invalid("title", "must not be empty"));
                }
                check_content(title)?;
                if tracks.is_empty() || tracks.len() > MAX_PLAYLIST_TRACKS {
                    return Err(Error::invalid(
                        "tracks",
                        format!("must have 1 to {MAX_PLAYLIST_TRACKS} tracks"),
                    ));
                }
                tracks
                    .iter()
                    .try_for_each(|key| check_key("tracks", key, MediaKind::Audio))
            }
        }
    }
}

fn check_content(content: &str) -> Result<()> {
    let len = content.chars().count();
    if len > MAX_CONTENT_CHARS {
        return Err(Error::invalid(
            "content",
            format!("{len} characters, at most {MAX_CONTENT_CHARS} allowed"),
        ));
    }
    Ok(())
}

fn check_caption(content: Option<&str>) -> Result<()> {
    content.map_or(Ok(()), check_content)
}

fn check_key(field: &'static str, key: &Key, kind: MediaKind) -> Result<()> {
    if key.validate().is_err() || !kind.prefix().contains(key) {
        return Err(Error::invalid(
            field,
            format!("'{key}' is not a {kind} object"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn playlist(n: usize) -> PostRequest {
        PostRequest::Playlist {
            user_id: "u1".into(),
            title: "mix".into(),
            tracks: (0..n).map(|i| Key::from(format!("audio/x/{i}.mp3"))).collect(),
        }
    }

    #[test]
    fn tagged_decoding() {
        let post = PostRequest::from_json(
            r#"{"type": "playlist", "userId": "u1", "title": "mix", "tracks": ["audio/a/1.mp3"]}"#,
        )
        .unwrap();
        assert_eq!(post, playlist(0).with_tracks(&["audio/a/1.mp3"]));

        let err = PostRequest::from_json(r#"{"type": "poll", "userId": "u1"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn text_limits() {
        let ok = PostRequest::Text {
            user_id: "u1".into(),
            content: "é".repeat(MAX_CONTENT_CHARS),
        };
        assert!(ok.validate().is_ok());

        let long = PostRequest::Text {
            user_id: "u1".into(),
            content: "a".repeat(MAX_CONTENT_CHARS + 1),
        };
        assert_eq!(long.validate().unwrap_err().kind(), ErrorKind::Validation);

        let anon = PostRequest::Text {
            user_id: " ".into(),
            content: "hi".into(),
        };
        assert_eq!(anon.validate().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn media_key_prefix() {
        let post = PostRequest::Video {
            user_id: "u1".into(),
            content: None,
            video_key: "image/x/cat.png".into(),
        };
        assert!(post.validate().is_err());
    }

    #[test]
    fn playlist_bounds() {
        assert!(playlist(0).validate().is_err());
        assert!(playlist(1).validate().is_ok());
        assert!(playlist(MAX_PLAYLIST_TRACKS).validate().is_ok());
        assert!(playlist(MAX_PLAYLIST_TRACKS + 1).validate().is_err());

        let mixed = playlist(0).with_tracks(&["audio/a/1.mp3", "video/b/2.mp4"]);
        assert!(mixed.validate().is_err());
    }

    impl PostRequest {
        fn with_tracks(self, keys: &[&str]) -> Self {
            match self {
                Self::Playlist { user_id, title, .. } => Self::Playlist {
                    user_id,
                    title,
                    tracks: keys.iter().map(|k| Key::from(*k)).collect(),
                },
                other => other,
            }
        }
    }
}
