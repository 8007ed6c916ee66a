// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in plugin catalog.
//!
//! A fixed table mapping engine device categories to the plugin variants
//! compiled into simbridge. Categories outside the table get no plugin.

use simbridge_core::{DeviceCategory, Plugin};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::builtin::{EmitterPlugin, LedPlugin, SensorPlugin};

/// Plugin variants bundled with simbridge, one per supported device category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum BuiltinVariant {
    Lidar,
    Camera,
    Gps,
    RangeFinder,
    DistanceSensor,
    LightSensor,
    Led,
    Emitter,
    Receiver,
    Compass,
}

impl BuiltinVariant {
    /// The variant bound to an engine category, if the category is supported.
    pub fn for_category(category: DeviceCategory) -> Option<Self> {
        match category {
            DeviceCategory::Lidar => Some(Self::Lidar),
            DeviceCategory::Camera => Some(Self::Camera),
            DeviceCategory::Gps => Some(Self::Gps),
            DeviceCategory::RangeFinder => Some(Self::RangeFinder),
            DeviceCategory::DistanceSensor => Some(Self::DistanceSensor),
            DeviceCategory::LightSensor => Some(Self::LightSensor),
            DeviceCategory::Led => Some(Self::Led),
            DeviceCategory::Emitter => Some(Self::Emitter),
            DeviceCategory::Receiver => Some(Self::Receiver),
            DeviceCategory::Compass => Some(Self::Compass),
            _ => None,
        }
    }

    /// The engine category this variant drives.
    pub fn category(self) -> DeviceCategory {
        match self {
            Self::Lidar => DeviceCategory::Lidar,
            Self::Camera => DeviceCategory::Camera,
            Self::Gps => DeviceCategory::Gps,
            Self::RangeFinder => DeviceCategory::RangeFinder,
            Self::DistanceSensor => DeviceCategory::DistanceSensor,
            Self::LightSensor => DeviceCategory::LightSensor,
            Self::Led => DeviceCategory::Led,
            Self::Emitter => DeviceCategory::Emitter,
            Self::Receiver => DeviceCategory::Receiver,
            Self::Compass => DeviceCategory::Compass,
        }
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            Self::Lidar => "Range scans and point clouds from a lidar",
            Self::Camera => "Color images from a camera",
            Self::Gps => "Absolute position and ground speed",
            Self::RangeFinder => "Depth images from a range finder",
            Self::DistanceSensor => "Single range measurements from a proximity sensor",
            Self::LightSensor => "Ambient light irradiance",
            Self::Led => "Drives an LED from integer commands",
            Self::Emitter => "Sends text commands through a wireless emitter",
            Self::Receiver => "Publishes packets received by a wireless receiver",
            Self::Compass => "Magnetic north direction from a compass",
        }
    }

    /// Returns true for variants that consume commands instead of publishing samples.
    pub fn is_actuator(self) -> bool {
        matches!(self, Self::Led | Self::Emitter)
    }

    /// Create a fresh, uninitialized plugin of this variant.
    pub fn instantiate(self) -> Box<dyn Plugin> {
        match self {
            Self::Led => Box::new(LedPlugin::new()),
            Self::Emitter => Box::new(EmitterPlugin::new()),
            sensor => Box::new(SensorPlugin::new(sensor)),
        }
    }
}

/// A catalog row for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// The bundled plugin variant.
    pub variant: BuiltinVariant,
    /// Engine device category it drives.
    pub category: DeviceCategory,
    /// One-line description.
    pub description: &'static str,
}

/// Returns every built-in variant with its category.
pub fn builtin_catalog() -> Vec<CatalogEntry> {
    BuiltinVariant::iter()
        .map(|variant| CatalogEntry {
            variant,
            category: variant.category(),
            description: variant.description(),
        })
        .collect()
}

/// Search the built-in catalog by query string.
///
/// Filters entries whose name or description contains the query (case-insensitive).
/// If query is empty, returns all entries.
pub fn search_catalog(query: &str) -> Vec<CatalogEntry> {
    if query.is_empty() {
        return builtin_catalog();
    }
    let query_lower = query.to_lowercase();
    builtin_catalog()
        .into_iter()
        .filter(|e| {
            e.variant.to_string().to_lowercase().contains(&query_lower)
                || e.description.to_lowercase().contains(&query_lower)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_returns_ten_entries() {
        assert_eq!(builtin_catalog().len(), 10);
    }

    #[test]
    fn every_supported_category_maps_to_exactly_one_variant() {
        for category in DeviceCategory::iter() {
            let matching: Vec<_> = BuiltinVariant::iter()
                .filter(|v| v.category() == category)
                .collect();
            match BuiltinVariant::for_category(category) {
                Some(variant) => assert_eq!(matching, vec![variant]),
                None => assert!(matching.is_empty(), "{category} has an orphan variant"),
            }
        }
    }

    #[test]
    fn unsupported_categories_have_no_variant() {
        for category in [
            DeviceCategory::Motor,
            DeviceCategory::PositionSensor,
            DeviceCategory::InertialUnit,
            DeviceCategory::Unknown,
        ] {
            assert_eq!(BuiltinVariant::for_category(category), None);
        }
    }

    #[test]
    fn only_led_and_emitter_are_actuators() {
        let actuators: Vec<_> = BuiltinVariant::iter().filter(|v| v.is_actuator()).collect();
        assert_eq!(actuators, vec![BuiltinVariant::Led, BuiltinVariant::Emitter]);
    }

    #[test]
    fn search_catalog_finds_by_name_case_insensitive() {
        let results = search_catalog("LIDAR");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].variant, BuiltinVariant::Lidar);
    }

    #[test]
    fn search_catalog_by_description() {
        let results = search_catalog("wireless");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn search_catalog_empty_returns_all() {
        assert_eq!(search_catalog("").len(), 10);
    }

    #[test]
    fn search_catalog_no_match() {
        assert!(search_catalog("xyz_nonexistent").is_empty());
    }
}
