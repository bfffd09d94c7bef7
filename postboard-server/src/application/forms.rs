//! Submission forms and their validation.

use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::error::FieldErrors;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str = "Select a valid choice.";
pub const INVALID_IMAGE_MESSAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED_MESSAGE)));
    }
    Ok(())
}

fn collect(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::default();
    for (field, errs) in errors.field_errors() {
        for err in errs.iter() {
            let message = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            out.add(field.to_string(), message);
        }
    }
    out
}

/// Image as submitted by a client: base64 payload plus its declared metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageUpload {
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Gif,
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Detects the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn decode(&self) -> Option<DecodedImage> {
        if let Some(content_type) = &self.content_type {
            if !content_type.starts_with("image/") {
                return None;
            }
        }
        let bytes = STANDARD.decode(self.data.trim()).ok()?;
        let format = ImageFormat::sniff(&bytes)?;
        Some(DecodedImage { format, bytes })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostForm {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub image: Option<ImageUpload>,
}

impl PostForm {
    /// Checks everything that does not need the store; the decoded image is
    /// returned so it is only decoded once.
    pub fn clean(&self) -> Result<Option<DecodedImage>, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(errs) => collect(&errs),
        };

        let image = match &self.image {
            None => None,
            Some(upload) => {
                let decoded = upload.decode();
                if decoded.is_none() {
                    errors.add("image", INVALID_IMAGE_MESSAGE);
                }
                decoded
            }
        };

        if errors.is_empty() {
            Ok(image)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|errs| collect(&errs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Choice,
    Image,
}

/// Description of one form field, sent alongside create/edit views.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

pub const POST_FORM_FIELDS: [FormField; 3] = [
    FormField {
        name: "text",
        label: "Post text",
        help_text: "Enter the text of the post",
        required: true,
        kind: FieldKind::Text,
    },
    FormField {
        name: "group",
        label: "Group",
        help_text: "Group the post will belong to",
        required: false,
        kind: FieldKind::Choice,
    },
    FormField {
        name: "image",
        label: "Image",
        help_text: "",
        required: false,
        kind: FieldKind::Image,
    },
];

pub const COMMENT_FORM_FIELDS: [FormField; 1] = [FormField {
    name: "text",
    label: "Add a comment",
    help_text: "Comment text",
    required: true,
    kind: FieldKind::Text,
}];
