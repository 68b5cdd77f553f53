//! Room index: creates rooms under unique short codes and looks them up.

use std::sync::Arc;

use dashmap::DashMap;
use rand::RngCore;

use crate::state::room::Room;

/// Number of characters in a room code.
const CODE_LENGTH: usize = 4;
/// Standard base32 alphabet the code characters are drawn from.
const BASE32_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Creates rooms with unique short codes and resolves codes to rooms.
///
/// Codes are stored upper-cased; collisions are not checked, the code space
/// is accepted as large enough for a process lifetime. Rooms are never
/// evicted.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: DashMap<String, Arc<Room>>,
}

impl RoomManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty lobby-phase room under a fresh code.
    pub fn create_room(&self) -> Arc<Room> {
        let code = generate_code();
        let room = Arc::new(Room::new(code.clone()));
        self.rooms.insert(code, Arc::clone(&room));
        room
    }

    /// Look up a room by code.
    ///
    /// Lookup is case-insensitive but does not trim: a padded code misses.
    pub fn get_room(&self, code: &str) -> Option<Arc<Room>> {
        self.rooms
            .get(&code.to_uppercase())
            .map(|entry| Arc::clone(entry.value()))
    }
}

/// Generate a room code: base32 over 8 random bytes, truncated to
/// [`CODE_LENGTH`] characters, with transcription-ambiguous characters
/// remapped (O→A, I→B, 0→C, 1→D).
fn generate_code() -> String {
    let mut bytes = [0u8; 8];
    rand::rng().fill_bytes(&mut bytes);

    // Only the first 20 bits survive the truncation to 4 characters.
    let chunk =
        u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]);

    (0..CODE_LENGTH)
        .map(|index| {
            let value = (chunk >> (19 - 5 * index)) & 0x1f;
            match BASE32_ALPHABET[value as usize] as char {
                'O' => 'A',
                'I' => 'B',
                '0' => 'C',
                '1' => 'D',
                other => other,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::Phase;

    #[test]
    fn create_room_registers_a_lobby_under_its_code() {
        let manager = RoomManager::new();
        let room = manager.create_room();

        assert_eq!(room.code().len(), CODE_LENGTH);
        assert_eq!(room.snapshot().phase, Phase::Lobby);

        let found = manager.get_room(room.code()).unwrap();
        assert_eq!(found.code(), room.code());
    }

    #[test]
    fn lookup_is_case_insensitive_but_never_trims() {
        let manager = RoomManager::new();
        let room = manager.create_room();

        assert!(manager.get_room(&room.code().to_lowercase()).is_some());
        assert!(manager.get_room(&format!("  {}  ", room.code())).is_none());
    }

    #[test]
    fn codes_avoid_transcription_ambiguous_characters() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            for ch in code.chars() {
                assert!(ch.is_ascii_uppercase() || ch.is_ascii_digit());
                assert!(!matches!(ch, 'O' | 'I' | '0' | '1'), "ambiguous {ch} in {code}");
            }
        }
    }
}
