//! Weather state holder.
//!
//! Keeps the forecast currently on screen as an immutable [`WeatherSnapshot`]
//! behind an `Arc`. Updates never modify a snapshot that may be mid-draw; they
//! build the next one and swap it in.

use log::debug;
use std::sync::Arc;

use crate::icons::IconProvider;
use crate::WeatherSnapshot;

/// A partial forecast. Only the fields that are `Some` are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeatherUpdate {
    pub high: Option<String>,
    pub low: Option<String>,
    pub condition_id: Option<i32>,
}

impl WeatherUpdate {
    pub fn is_empty(&self) -> bool {
        self.high.is_none() && self.low.is_none() && self.condition_id.is_none()
    }
}

#[derive(Debug, Default)]
pub struct WeatherStore {
    current: Arc<WeatherSnapshot>,
}

impl WeatherStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<WeatherSnapshot> {
        Arc::clone(&self.current)
    }

    /// Merge `update` into the current forecast and publish the result.
    ///
    /// A non-zero condition id looks up its icon through `icons` and scales it
    /// to `font_size` pixels high. An id of zero, or one the provider does not
    /// know, leaves the previous icon in place.
    pub fn apply_update<P>(
        &mut self,
        update: WeatherUpdate,
        icons: &P,
        font_size: u32,
    ) -> Arc<WeatherSnapshot>
    where
        P: IconProvider + ?Sized,
    {
        let mut next = WeatherSnapshot::clone(&self.current);

        if let Some(high) = update.high {
            next.high = Some(high);
        }
        if let Some(low) = update.low {
            next.low = Some(low);
        }
        if let Some(condition_id) = update.condition_id {
            next.condition_id = condition_id;
            if condition_id != 0 {
                match icons.icon_for(condition_id) {
                    Some(icon) => next.icon = Some(icon.scaled_to_height(font_size)),
                    None => debug!("no icon for weather condition {condition_id}"),
                }
            }
        }

        self.current = Arc::new(next);
        self.snapshot()
    }
}
