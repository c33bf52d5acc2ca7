//! Lesson-type resolution from room id and frame size.

use crate::config::RoomConfig;
use std::collections::HashMap;

/// Label used whenever a room or size cannot be resolved
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Maps `(room_id, frame_size)` pairs to course and lesson-type labels.
///
/// Built once from configuration and immutable afterwards. The per-room size
/// tables are many-to-one: the capture pipeline changed frame sizes over time
/// without changing lesson semantics, so several historical sizes can carry
/// the same label.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    rooms: HashMap<String, RoomTable>,
}

#[derive(Debug, Clone)]
struct RoomTable {
    course_name: String,
    by_size: HashMap<(u32, u32), String>,
}

impl TypeResolver {
    pub fn from_config(rooms: &[RoomConfig]) -> Self {
        let rooms = rooms
            .iter()
            .map(|room| {
                let by_size = room
                    .video_types
                    .iter()
                    .map(|rule| ((rule.width, rule.height), rule.label.clone()))
                    .collect();
                (
                    room.room_id.clone(),
                    RoomTable {
                        course_name: room.course_name.clone(),
                        by_size,
                    },
                )
            })
            .collect();

        Self { rooms }
    }

    /// Course label for a room; "Unknown" for unrecognized rooms
    pub fn course_name(&self, room_id: &str) -> String {
        self.rooms
            .get(room_id)
            .map(|room| room.course_name.clone())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }

    /// Lesson-type label for a room and frame size; "Unknown" for
    /// unrecognized rooms or sizes, never an error
    pub fn video_type(&self, room_id: &str, size: (u32, u32)) -> String {
        self.rooms
            .get(room_id)
            .and_then(|room| room.by_size.get(&size).cloned())
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn resolver() -> TypeResolver {
        TypeResolver::from_config(&Config::default().rooms)
    }

    #[test]
    fn test_known_room_and_size() {
        let resolver = resolver();
        assert_eq!(resolver.course_name("39c0c30a65e657b95037"), "Beginner");
        assert_eq!(
            resolver.video_type("39c0c30a65e657b95037", (1280, 720)),
            "phrasal_verbs"
        );
    }

    #[test]
    fn test_historical_sizes_share_label() {
        let resolver = resolver();
        // encoder upgrade changed the frame size, not the lesson type
        let old = resolver.video_type("7d21aa0cf4b2e09c1833", (640, 480));
        let new = resolver.video_type("7d21aa0cf4b2e09c1833", (1280, 720));
        assert_eq!(old, "idioms");
        assert_eq!(old, new);
    }

    #[test]
    fn test_unknown_room_falls_back() {
        let resolver = resolver();
        assert_eq!(resolver.course_name("deadbeef"), UNKNOWN_LABEL);
        assert_eq!(resolver.video_type("deadbeef", (1280, 720)), UNKNOWN_LABEL);
    }

    #[test]
    fn test_unknown_size_for_known_room() {
        let resolver = resolver();
        assert_eq!(
            resolver.video_type("39c0c30a65e657b95037", (800, 600)),
            UNKNOWN_LABEL
        );
    }
}
