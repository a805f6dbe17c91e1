use crate::detect::result::{DetectionEvent, DetectionSet};

/// Length of the synthesized detection cycle, in frames.
pub const SYNTHETIC_CYCLE: u64 = 20;

/// Placeholder detections for frames without real detection metadata.
///
/// Output depends only on `frame_count % 20`:
///
/// | phase   | events                      |
/// |---------|-----------------------------|
/// | 0..5    | car 0.85                    |
/// | 5..8    | truck 0.92                  |
/// | 8..10   | motorcycle 0.78             |
/// | 15      | car 0.89, bus 0.76          |
/// | other   | none                        |
///
/// The result is always tagged `Provenance::Synthesized`.
pub fn synthesize(frame_count: u64) -> DetectionSet {
    let events = match frame_count % SYNTHETIC_CYCLE {
        0..=4 => vec![DetectionEvent::new(1, "car", 0.85)],
        5..=7 => vec![DetectionEvent::new(2, "truck", 0.92)],
        8..=9 => vec![DetectionEvent::new(3, "motorcycle", 0.78)],
        15 => vec![
            DetectionEvent::new(4, "car", 0.89),
            DetectionEvent::new(5, "bus", 0.76),
        ],
        _ => Vec::new(),
    };
    DetectionSet::synthesized(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(frame_count: u64) -> Vec<String> {
        synthesize(frame_count)
            .events
            .into_iter()
            .map(|event| event.label)
            .collect()
    }

    #[test]
    fn follows_cycle_table() {
        assert_eq!(labels(0), vec!["car"]);
        assert_eq!(labels(3), vec!["car"]);
        assert_eq!(labels(4), vec!["car"]);
        assert_eq!(labels(5), vec!["truck"]);
        assert_eq!(labels(7), vec!["truck"]);
        assert_eq!(labels(8), vec!["motorcycle"]);
        assert_eq!(labels(9), vec!["motorcycle"]);
        assert_eq!(labels(15), vec!["car", "bus"]);
        for empty in [10, 11, 12, 13, 14, 16, 17, 18, 19] {
            assert!(labels(empty).is_empty(), "frame {empty} should be empty");
        }
    }

    #[test]
    fn depends_only_on_phase() {
        for count in 0..200u64 {
            assert_eq!(synthesize(count), synthesize(count % SYNTHETIC_CYCLE));
        }
        assert_eq!(synthesize(u64::MAX), synthesize(u64::MAX % SYNTHETIC_CYCLE));
    }

    #[test]
    fn confidences_and_ids_are_fixed() {
        let set = synthesize(15);
        assert!(set.is_synthesized());
        assert_eq!(set.count(), 2);
        assert_eq!(set.events[0], DetectionEvent::new(4, "car", 0.89));
        assert_eq!(set.events[1], DetectionEvent::new(5, "bus", 0.76));
        assert_eq!(synthesize(6).events[0].confidence, 0.92);
        assert_eq!(synthesize(9).events[0].id, 3);
    }

    #[test]
    fn diagnostic_lines_are_marked_simulated() {
        let lines = synthesize(1).diagnostic_lines();
        assert_eq!(
            lines,
            vec!["SIMULATED: Detection: ID: 1 Label: car Confidence: 0.85"]
        );
    }
}
