use std::collections::HashSet;

use crate::data_loaders::config::DiscoverySettings;

use super::placement::{AspectRatio, Discovery, WidgetPlacement};

/// Persisted placements first, in stored order, then one disabled placement
/// per discovered id that is not configured yet. Existing entries are never
/// dropped, renamed or reordered.
pub fn merge_discovered(
    persisted: &[WidgetPlacement],
    discovered: &Discovery,
    defaults: &DiscoverySettings,
) -> Vec<WidgetPlacement> {
    let mut merged = persisted.to_vec();
    let mut known: HashSet<String> = persisted.iter().map(|p| p.id.clone()).collect();

    for (id, meta) in discovered {
        if !known.insert(id.clone()) {
            continue;
        }

        let aspect_ratio = meta
            .aspect_ratio
            .or_else(|| AspectRatio::fixed(defaults.default_aspect_ratio))
            .unwrap_or_default();

        merged.push(WidgetPlacement {
            id: id.clone(),
            enabled: false,
            x: defaults.default_x,
            y: defaults.default_y,
            width: None,
            height: Some(defaults.default_height),
            aspect_ratio,
        });
    }

    merged
}

/// Fills in `width = trunc(height * ratio)` for fixed-ratio placements that
/// only carry a height.
pub fn derive_missing_widths(placements: &mut [WidgetPlacement]) {
    for placement in placements.iter_mut() {
        if placement.width.is_some() {
            continue;
        }
        let (Some(height), Some(ratio)) = (placement.height, placement.aspect_ratio.ratio()) else {
            continue;
        };
        placement.width = Some((height as f64 * ratio) as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::placement::WidgetMeta;

    fn placed(id: &str, enabled: bool, x: i32, y: i32) -> WidgetPlacement {
        WidgetPlacement {
            enabled,
            x,
            y,
            width: Some(200),
            height: Some(100),
            ..WidgetPlacement::new(id)
        }
    }

    fn discovery(ids: &[(&str, Option<AspectRatio>)]) -> Discovery {
        ids.iter()
            .map(|(id, ratio)| (id.to_string(), WidgetMeta { aspect_ratio: *ratio }))
            .collect()
    }

    #[test]
    fn new_widget_gets_disabled_defaults() {
        let persisted = vec![placed("clock", true, 10, 20)];
        let found = discovery(&[("clock", None), ("weather", None)]);

        let merged = merge_discovered(&persisted, &found, &DiscoverySettings::default());

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], persisted[0]);
        let weather = &merged[1];
        assert_eq!(weather.id, "weather");
        assert!(!weather.enabled);
        assert_eq!((weather.x, weather.y), (100, 100));
        assert_eq!(weather.height, Some(100));
        assert_eq!(weather.width, None);
        assert_eq!(weather.aspect_ratio, AspectRatio::Fixed(2.0));
    }

    #[test]
    fn discovery_order_and_metadata_are_kept() {
        let found = discovery(&[
            ("status", Some(AspectRatio::Flex)),
            ("quote", Some(AspectRatio::Fixed(3.0))),
        ]);

        let merged = merge_discovered(&[], &found, &DiscoverySettings::default());

        let ids: Vec<_> = merged.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["status", "quote"]);
        assert!(merged[0].aspect_ratio.is_flex());
        assert_eq!(merged[1].aspect_ratio, AspectRatio::Fixed(3.0));
    }

    #[test]
    fn merging_twice_changes_nothing() {
        let persisted = vec![placed("clock", true, 0, 0), placed("orphan", false, 5, 5)];
        let found = discovery(&[("weather", None), ("clock", None), ("weather", None)]);
        let defaults = DiscoverySettings::default();

        let once = merge_discovered(&persisted, &found, &defaults);
        let twice = merge_discovered(&once, &found, &defaults);

        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
        assert_eq!(once[1].id, "orphan");
    }

    #[test]
    fn widths_follow_height_and_ratio() {
        let mut placements = vec![
            WidgetPlacement {
                height: Some(100),
                aspect_ratio: AspectRatio::Fixed(1.75),
                ..WidgetPlacement::new("clock")
            },
            WidgetPlacement {
                height: Some(100),
                aspect_ratio: AspectRatio::Flex,
                ..WidgetPlacement::new("status")
            },
            WidgetPlacement {
                width: Some(50),
                height: Some(100),
                ..WidgetPlacement::new("quote")
            },
        ];

        derive_missing_widths(&mut placements);

        assert_eq!(placements[0].width, Some(175));
        assert_eq!(placements[1].width, None);
        assert_eq!(placements[2].width, Some(50));
    }
}
