//! Game model and related functionality

use serde::Serialize;
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::validation::{DESCRIPTION_MAX_CHARS, FieldErrors, NAME_MAX_CHARS, check_text};

/// Monetary amount of a catalog entry
///
/// Always finite, non-negative, within the `NUMERIC(10,2)` column range and
/// rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

/// Reasons a value cannot become a [`Price`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("Not a valid number.")]
    NotNumeric,

    #[error("Must be zero or greater.")]
    Negative,

    #[error("Must be at most 99999999.99.")]
    TooLarge,
}

impl Price {
    /// Largest amount a `NUMERIC(10,2)` column holds
    pub const MAX: f64 = 99_999_999.99;

    pub fn new(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::NotNumeric);
        }
        if value < 0.0 {
            return Err(PriceError::Negative);
        }

        let rounded = (value * 100.0).round() / 100.0;
        if rounded > Self::MAX {
            return Err(PriceError::TooLarge);
        }

        // -0.0 would otherwise serialize with its sign
        Ok(Self(if rounded == 0.0 { 0.0 } else { rounded }))
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| PriceError::NotNumeric)?;
        Self::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Game entity, as read back from a store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Price,
}

/// Validated game creation payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    name: String,
    description: String,
    price: Price,
}

impl NewGame {
    /// Build a payload, trimming and checking the text fields
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Price,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = errors.collect("name", check_text(&name.into(), NAME_MAX_CHARS));
        let description = errors.collect(
            "description",
            check_text(&description.into(), DESCRIPTION_MAX_CHARS),
        );

        match (name, description) {
            (Some(name), Some(description)) if errors.is_empty() => Ok(Self {
                name,
                description,
                price,
            }),
            _ => Err(errors),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Price {
        self.price
    }
}

/// Validated partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
    name: Option<String>,
    description: Option<String>,
    price: Option<Price>,
}

impl GamePatch {
    pub fn new(
        name: Option<String>,
        description: Option<String>,
        price: Option<Price>,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = name.and_then(|n| errors.collect("name", check_text(&n, NAME_MAX_CHARS)));
        let description = description.and_then(|d| {
            errors.collect("description", check_text(&d, DESCRIPTION_MAX_CHARS))
        });

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            name,
            description,
            price,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Option<Price> {
        self.price
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }

    /// Apply the patch in place; the id is never touched
    pub fn apply_to(&self, game: &mut Game) {
        if let Some(name) = &self.name {
            game.name = name.clone();
        }
        if let Some(description) = &self.description {
            game.description = description.clone();
        }
        if let Some(price) = self.price {
            game.price = price;
        }
    }
}
