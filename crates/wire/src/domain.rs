use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which shelf section a title belongs to, as the server stores it and as
/// the shelf page emits it in `data-video-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoType {
    #[serde(rename = "MO")]
    Movie,
    #[serde(rename = "TV")]
    Tv,
}

impl fmt::Display for VideoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoType::Movie => f.write_str("Movie"),
            VideoType::Tv => f.write_str("TV"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized video type '{0}', expected MO or TV")]
pub struct ParseVideoTypeError(pub String);

impl FromStr for VideoType {
    type Err = ParseVideoTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MO" => Ok(VideoType::Movie),
            "TV" => Ok(VideoType::Tv),
            _ => Err(ParseVideoTypeError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_wire_tokens() {
        assert_eq!(serde_json::to_string(&VideoType::Movie).unwrap(), "\"MO\"");
        assert_eq!(serde_json::to_string(&VideoType::Tv).unwrap(), "\"TV\"");
    }

    #[test]
    fn parses_wire_tokens_case_insensitively() {
        assert_eq!("MO".parse::<VideoType>().unwrap(), VideoType::Movie);
        assert_eq!("tv".parse::<VideoType>().unwrap(), VideoType::Tv);
        assert_eq!(" Mo ".parse::<VideoType>().unwrap(), VideoType::Movie);
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = "MOVIE".parse::<VideoType>().unwrap_err();
        assert_eq!(err.0, "MOVIE");
    }
}
