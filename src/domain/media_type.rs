use std::fmt;
use std::str::FromStr;

/// Media type tag stored on an uploaded file; selects the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Image,
    Audio,
    Pdf,
    Other,
}

impl MediaType {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "application/pdf" => Self::Pdf,
            m if m.starts_with("image/") => Self::Image,
            m if m.starts_with("audio/") => Self::Audio,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Audio => "audio",
            MediaType::Pdf => "pdf",
            MediaType::Other => "other",
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "audio" => Ok(MediaType::Audio),
            "pdf" => Ok(MediaType::Pdf),
            "other" => Ok(MediaType::Other),
            _ => Err(format!("Invalid media type: {}", s)),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
