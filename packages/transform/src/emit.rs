//! Synthetic id assignment and output rendering.

use elk_transform_models::{
    BoundaryPayload, HazardPayload, LocationPayload, Notes, PresentationPayload, TransformOutput,
};

use crate::aggregate::{Aggregate, HazardEntry, LocationEntry};

/// Gives every entity without an id a `new-location-<n>` or
/// `new-hazard-<n>` id.
///
/// `n` counts from 1 per entity kind in ascending normalized-name order,
/// so the same documents always produce the same ids.
pub fn assign_ids(aggregate: &mut Aggregate) {
    let mut next = 1;
    for entry in aggregate.locations.values_mut().filter(|e| e.id.is_none()) {
        entry.id = Some(format!("new-location-{next}"));
        next += 1;
    }

    let mut next = 1;
    for entry in aggregate.hazards.values_mut().filter(|e| e.id.is_none()) {
        entry.id = Some(format!("new-hazard-{next}"));
        next += 1;
    }
}

/// Renders the aggregate. Entities without an id are left out, as are
/// presentations whose hazard has no id.
#[must_use]
pub fn build_output(aggregate: &Aggregate) -> TransformOutput {
    let mut locations: Vec<LocationPayload> = aggregate
        .locations
        .values()
        .filter_map(|entry| location_payload(entry, aggregate))
        .collect();
    locations.sort_by_cached_key(|l| l.name.to_lowercase());

    let mut hazards: Vec<HazardPayload> = aggregate
        .hazards
        .values()
        .filter_map(hazard_payload)
        .collect();
    hazards.sort_by_cached_key(|h| h.name.to_lowercase());

    TransformOutput { locations, hazards }
}

fn hazard_payload(entry: &HazardEntry) -> Option<HazardPayload> {
    Some(HazardPayload {
        id: entry.id.clone()?,
        name: entry.name.clone(),
        severity: entry.severity,
        category: entry.category,
        description: entry.description.clone(),
    })
}

fn location_payload(entry: &LocationEntry, aggregate: &Aggregate) -> Option<LocationPayload> {
    let mut presentations: Vec<PresentationPayload> = entry
        .presentations
        .iter()
        .filter_map(|(hazard_key, presentation)| {
            let hazard = aggregate.hazards.get(hazard_key)?;
            Some(PresentationPayload {
                hazard_id: hazard.id.clone()?,
                hazard_name: hazard.name.clone(),
                boundary: BoundaryPayload::from_boundary(&presentation.boundary),
                notes: Notes::from_sorted(presentation.notes.iter().cloned().collect()),
                hazard_severity: hazard.severity,
                hazard_type: hazard.category,
            })
        })
        .collect();
    presentations.sort_by(|a, b| a.hazard_name.cmp(&b.hazard_name));

    Some(LocationPayload {
        id: entry.id.clone()?,
        name: entry.name.clone(),
        kind: entry.kind,
        latitude: entry.latitude,
        longitude: entry.longitude,
        description: entry.description.clone(),
        image: entry.image.clone(),
        google_maps_id: entry.google_maps_id.clone(),
        boundary: BoundaryPayload::from_boundary(&entry.boundary),
        presentations,
    })
}

#[cfg(test)]
mod tests {
    use elk_geometry::{BoundarySet, Point, Polygon};

    use super::*;
    use crate::aggregate::PresentationEntry;

    fn aggregate() -> Aggregate {
        let mut aggregate = Aggregate::new();
        for name in ["Zion", "alpine lake", "Bear Creek"] {
            aggregate
                .locations
                .insert(name.to_lowercase(), LocationEntry::new(name));
        }
        for name in ["Wildfire", "Bear Activity"] {
            aggregate
                .hazards
                .insert(name.to_lowercase(), HazardEntry::new(name));
        }
        aggregate
    }

    #[test]
    fn ids_follow_normalized_name_order() {
        let mut aggregate = aggregate();
        aggregate.locations.get_mut("bear creek").unwrap().id = Some("17".to_string());
        assign_ids(&mut aggregate);

        assert_eq!(aggregate.locations["alpine lake"].id.as_deref(), Some("new-location-1"));
        assert_eq!(aggregate.locations["bear creek"].id.as_deref(), Some("17"));
        assert_eq!(aggregate.locations["zion"].id.as_deref(), Some("new-location-2"));
        assert_eq!(aggregate.hazards["bear activity"].id.as_deref(), Some("new-hazard-1"));
        assert_eq!(aggregate.hazards["wildfire"].id.as_deref(), Some("new-hazard-2"));
    }

    #[test]
    fn output_is_sorted_case_insensitively() {
        let mut aggregate = aggregate();
        assign_ids(&mut aggregate);
        let output = build_output(&aggregate);

        let names: Vec<&str> = output.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["alpine lake", "Bear Creek", "Zion"]);
        let names: Vec<&str> = output.hazards.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Bear Activity", "Wildfire"]);
    }

    #[test]
    fn presentations_sorted_with_closed_boundaries() {
        let mut aggregate = aggregate();
        let zion = aggregate.locations.get_mut("zion").unwrap();
        zion.presentations.insert(
            "wildfire".to_string(),
            PresentationEntry {
                boundary: BoundarySet(vec![Polygon(vec![
                    Point::new(0.0, 0.0),
                    Point::new(0.0, 1.0),
                    Point::new(1.0, 1.0),
                ])]),
                ..PresentationEntry::default()
            },
        );
        zion.presentations.insert(
            "bear activity".to_string(),
            PresentationEntry {
                notes: ["b".to_string(), "a".to_string()].into_iter().collect(),
                ..PresentationEntry::default()
            },
        );
        assign_ids(&mut aggregate);
        let output = build_output(&aggregate);

        let zion = output.locations.iter().find(|l| l.name == "Zion").unwrap();
        assert_eq!(zion.presentations.len(), 2);
        assert_eq!(zion.presentations[0].hazard_name, "Bear Activity");
        assert_eq!(
            zion.presentations[0].notes,
            Some(Notes::Many(vec!["a".to_string(), "b".to_string()]))
        );
        assert!(zion.presentations[0].boundary.is_none());

        let Some(BoundaryPayload::Polygon(ring)) = &zion.presentations[1].boundary else {
            panic!("expected a single closed ring");
        };
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn presentations_of_unidentified_hazards_are_omitted() {
        let mut aggregate = aggregate();
        aggregate
            .locations
            .get_mut("zion")
            .unwrap()
            .presentations
            .insert("wildfire".to_string(), PresentationEntry::default());
        aggregate.locations.get_mut("zion").unwrap().id = Some("1".to_string());

        let output = build_output(&aggregate);
        assert_eq!(output.locations.len(), 1);
        assert!(output.locations[0].presentations.is_empty());
        assert!(output.hazards.is_empty());
    }
}
