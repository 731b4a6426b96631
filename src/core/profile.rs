// borderly/src/core/profile.rs
use super::{BorderlyError, Result, SizeSpec};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A named set of border, resize and quality rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    pub name: String,
    pub border_width: SizeSpec,
    #[serde(rename = "BorderColour", default)]
    pub border_color: BorderColor,
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_width: Option<SizeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize_height: Option<SizeSpec>,
}

fn default_quality() -> u8 {
    90
}

impl Profile {
    pub fn new(name: impl Into<String>, border_width: SizeSpec) -> Self {
        Self {
            name: name.into(),
            border_width,
            border_color: BorderColor::default(),
            quality: default_quality(),
            resize_width: None,
            resize_height: None,
        }
    }

    pub fn with_border_color(mut self, color: BorderColor) -> Self {
        self.border_color = color;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_resize(mut self, width: Option<SizeSpec>, height: Option<SizeSpec>) -> Self {
        self.resize_width = width;
        self.resize_height = height;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BorderlyError::InvalidConfiguration(
                "Profile name cannot be empty".to_string(),
            ));
        }

        // The name becomes a folder and part of a file name.
        if self.name.contains(['/', '\\']) || self.name == "." || self.name == ".." {
            return Err(BorderlyError::InvalidConfiguration(format!(
                "Profile name '{}' is not usable as a folder name",
                self.name
            )));
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(BorderlyError::InvalidConfiguration(format!(
                "Profile '{}': quality must be between 1 and 100",
                self.name
            )));
        }

        Ok(())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::new("WhiteBorder", SizeSpec::parse("50px"))
    }
}

/// Validates every profile and checks that names are unique.
pub fn validate_profiles(profiles: &[Profile]) -> Result<()> {
    let mut seen = HashSet::new();
    for profile in profiles {
        profile.validate()?;
        if !seen.insert(profile.name.as_str()) {
            return Err(BorderlyError::InvalidConfiguration(format!(
                "Duplicate profile name '{}'",
                profile.name
            )));
        }
    }
    Ok(())
}

/// Which profiles a batch runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSelection {
    All,
    Single(String),
}

impl ProfileSelection {
    pub fn select(&self, profiles: &[Profile]) -> Result<Vec<Profile>> {
        match self {
            ProfileSelection::All => Ok(profiles.to_vec()),
            ProfileSelection::Single(name) => profiles
                .iter()
                .find(|profile| &profile.name == name)
                .map(|profile| vec![profile.clone()])
                .ok_or_else(|| {
                    BorderlyError::InvalidConfiguration(format!("Unknown profile '{}'", name))
                }),
        }
    }
}

/// Border fill colour as written in a profile.
///
/// Accepts `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)` and the CSS colour names. Text that does not parse is
/// kept as is and only fails a task that actually draws a border.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BorderColor {
    text: Cow<'static, str>,
    rgba: Option<Rgba<u8>>,
}

impl BorderColor {
    pub const WHITE: BorderColor = BorderColor {
        text: Cow::Borrowed("#FFFFFF"),
        rgba: Some(Rgba([255, 255, 255, 255])),
    };
    pub const BLACK: BorderColor = BorderColor {
        text: Cow::Borrowed("#000000"),
        rgba: Some(Rgba([0, 0, 0, 255])),
    };

    pub fn rgba(&self) -> Result<Rgba<u8>> {
        self.rgba.ok_or_else(|| {
            BorderlyError::InvalidConfiguration(format!("Invalid colour '{}'", self.text))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for BorderColor {
    fn default() -> Self {
        BorderColor::WHITE
    }
}

impl FromStr for BorderColor {
    type Err = BorderlyError;

    fn from_str(text: &str) -> Result<Self> {
        let rgba = parse_color(text).ok_or_else(|| {
            BorderlyError::InvalidConfiguration(format!("Invalid colour '{}'", text))
        })?;
        Ok(Self {
            text: Cow::Owned(text.to_string()),
            rgba: Some(rgba),
        })
    }
}

fn parse_color(text: &str) -> Option<Rgba<u8>> {
    let value = text.trim().to_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(args) = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = args
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect::<Option<_>>()?;
        return match channels[..] {
            [r, g, b] => Some(Rgba([r, g, b, 255])),
            [r, g, b, a] => Some(Rgba([r, g, b, a])),
            _ => None,
        };
    }

    let (r, g, b) = palette::named::from_str(&value)?.into_components();
    Some(Rgba([r, g, b, 255]))
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.is_ascii() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);

    let rgba = match hex.len() {
        3 => [short(0)?, short(1)?, short(2)?, 255],
        4 => [short(0)?, short(1)?, short(2)?, short(3)?],
        6 => [channel(0)?, channel(2)?, channel(4)?, 255],
        8 => [channel(0)?, channel(2)?, channel(4)?, channel(6)?],
        _ => return None,
    };
    Some(Rgba(rgba))
}

impl fmt::Display for BorderColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<String> for BorderColor {
    fn from(text: String) -> Self {
        let rgba = parse_color(&text);
        if rgba.is_none() {
            log::warn!("Unrecognised colour '{}', borders using it will fail", text);
        }
        Self {
            text: Cow::Owned(text),
            rgba,
        }
    }
}

impl From<BorderColor> for String {
    fn from(color: BorderColor) -> Self {
        color.text.into_owned()
    }
}
