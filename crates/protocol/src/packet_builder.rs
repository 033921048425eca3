//! Builder functions for the outbound packets the core actually sends.
//!
//! Each function appends one complete record (code byte, payload, and the
//! trailing newline unless the packet format forbids one) to `buf`; callers
//! are responsible for handing the accumulated bytes to [`crate::codec::PacketCodec`]
//! as a single [`crate::codec::Outbound`] or batching several records into one
//! bundle themselves.

use bytes::{BufMut, BytesMut};

use crate::codecs::*;
use crate::packets::PacketTypeOut;

fn code(ty: PacketTypeOut) -> u8 {
    ty.as_u8().wrapping_add(32)
}

/// PLO_LEVELNAME: the name of the level the client should display.
pub fn build_level_name(buf: &mut BytesMut, level: &str) {
    buf.put_u8(code(PacketTypeOut::LevelName));
    write_gstring(buf, level);
    buf.put_u8(b'\n');
}

/// PLO_LEVELMODTIME: the level file's modification time, used by the
/// client to decide whether its own cache is still valid.
pub fn build_level_modtime(buf: &mut BytesMut, modtime: u64) {
    buf.put_u8(code(PacketTypeOut::LevelModTime));
    write_gint4(buf, modtime as i32);
    buf.put_u8(b'\n');
}

/// PLO_FILEUPTODATE, repurposed as the "your cached copy of this level is
/// still current" marker sent instead of a full level resend when
/// `sendLevel`'s modtime check passes.
pub fn build_level_cache_reuse(buf: &mut BytesMut, level: &str) {
    buf.put_u8(code(PacketTypeOut::FileUpToDate));
    write_gstring(buf, level);
    buf.put_u8(b'\n');
}

/// PLO_LEVELSIGN: one sign's position and text.
pub fn build_level_sign(buf: &mut BytesMut, x: u8, y: u8, text: &str) {
    buf.put_u8(code(PacketTypeOut::LevelSign));
    write_gstring(buf, &format!("{x},{y},{text}"));
    buf.put_u8(b'\n');
}

/// PLO_LEVELLINK: one rectangular warp link to another level.
pub fn build_level_link(
    buf: &mut BytesMut,
    x: u8,
    y: u8,
    width: u8,
    height: u8,
    dest_level: &str,
    dest_x: i32,
    dest_y: i32,
) {
    buf.put_u8(code(PacketTypeOut::LevelLink));
    write_gstring(
        buf,
        &format!("{x},{y},{width},{height},{dest_level},{dest_x},{dest_y}"),
    );
    buf.put_u8(b'\n');
}

/// PLO_PLAYERWARP: server-initiated warp. `x`/`y` are pixel coordinates;
/// the wire format halves them into GChar halftiles.
pub fn build_player_warp(buf: &mut BytesMut, x: i32, y: i32, level_name: &str) {
    buf.put_u8(code(PacketTypeOut::PlayerWarp));
    write_gchar(buf, (x / 8) as i8);
    write_gchar(buf, (y / 8) as i8);
    write_gstring(buf, level_name);
    buf.put_u8(b'\n');
}

/// PLO_PLAYERPROPS: the session's own properties, sent to itself.
pub fn build_player_props(buf: &mut BytesMut, props_data: &[u8]) {
    buf.put_u8(code(PacketTypeOut::PlayerProps));
    buf.put_slice(props_data);
    buf.put_u8(b'\n');
}

/// PLO_OTHERPLPROPS: another player's properties, sent for level broadcast.
pub fn build_other_player_props(buf: &mut BytesMut, player_id: u16, props_data: &[u8]) {
    buf.put_u8(code(PacketTypeOut::OtherPlayerProps));
    write_gshort(buf, player_id as i16);
    buf.put_slice(props_data);
    buf.put_u8(b'\n');
}

/// PLO_ADDPLAYER: introduces a newly-visible player to the client.
pub fn build_add_player(buf: &mut BytesMut, player_id: u16, account_name: &str, props_data: &[u8]) {
    buf.put_u8(code(PacketTypeOut::AddPlayer));
    write_gshort(buf, player_id as i16);
    write_gstring(buf, account_name);
    buf.put_slice(props_data);
    buf.put_u8(b'\n');
}

/// PLO_DELPLAYER: a player left level-local visibility.
pub fn build_del_player(buf: &mut BytesMut, player_id: u16) {
    buf.put_u8(code(PacketTypeOut::DelPlayer));
    write_gshort(buf, player_id as i16);
    buf.put_u8(b'\n');
}

/// PLO_CLEARWEAPONS: sent once on login to initialize the client's weapon
/// list to empty before any weapons are added.
pub fn build_clear_weapons(buf: &mut BytesMut) {
    buf.put_u8(code(PacketTypeOut::ClearWeapons));
    buf.put_u8(b'\n');
}

/// PLO_DISCMESSAGE: advisory text sent immediately before closing a
/// session's socket (kick, timeout, server shutdown).
pub fn build_disconnect_message(buf: &mut BytesMut, message: &str) {
    buf.put_u8(code(PacketTypeOut::DiscMessage));
    write_gstring(buf, message);
    buf.put_u8(b'\n');
}

/// PLO_SERVERTEXT: a freeform server announcement or error string, used to
/// report resource-miss and policy-reject conditions to the client.
pub fn build_server_text(buf: &mut BytesMut, text: &str) {
    buf.put_u8(code(PacketTypeOut::ServerText));
    write_gstring(buf, text);
    buf.put_u8(b'\n');
}

/// PLO_TOALL: a chat line relayed to every player in the sender's level.
pub fn build_to_all(buf: &mut BytesMut, message: &str) {
    buf.put_u8(code(PacketTypeOut::ToAll));
    write_gstring(buf, message);
    buf.put_u8(b'\n');
}

/// PLO_PRIVATEMESSAGE: a whisper relayed to a single recipient.
pub fn build_private_message(buf: &mut BytesMut, message: &str) {
    buf.put_u8(code(PacketTypeOut::PrivateMessage));
    write_gstring(buf, message);
    buf.put_u8(b'\n');
}

/// PLO_SIGNATURE: one byte identifying the server build, sent once right
/// after login completes.
pub fn build_signature(buf: &mut BytesMut, version: i8) {
    buf.put_u8(code(PacketTypeOut::Signature));
    write_gchar(buf, version);
    buf.put_u8(b'\n');
}

/// PLO_RAWDATA: announces that the next `size` bytes are a raw payload
/// (the level board) consumed verbatim rather than newline-scanned, per
/// spec §4.1's raw-follows framing. Binary board data can itself contain
/// `\n`, so unlike the other builders this record is not newline-terminated;
/// the framer relies on the announced size, not a trailing delimiter.
pub fn build_raw_data(buf: &mut BytesMut, size: u32, data: &[u8]) {
    buf.put_u8(code(PacketTypeOut::RawData));
    write_guint5(buf, size);
    buf.put_u8(b'\n');
    buf.put_slice(data);
}

/// PLO_SETACTIVELEVEL: tells the client which level is now "active" for
/// rendering purposes (used for adjacent-level prefetch, §4.7).
pub fn build_set_active_level(buf: &mut BytesMut, level_name: &str) {
    buf.put_u8(code(PacketTypeOut::SetActiveLevel));
    write_gstring(buf, level_name);
    buf.put_u8(b'\n');
}

/// PLO_NEWWORLDTIME: the server's current world-time tick counter.
pub fn build_new_world_time(buf: &mut BytesMut, time: i32) {
    buf.put_u8(code(PacketTypeOut::NewWorldTime));
    write_gint4(buf, time);
    buf.put_u8(b'\n');
}

/// PLO_GHOSTICON: toggles the client's ghost-mode indicator.
pub fn build_ghost_icon(buf: &mut BytesMut, enabled: i8) {
    buf.put_u8(code(PacketTypeOut::GhostIcon));
    write_gchar(buf, enabled);
    buf.put_u8(b'\n');
}

/// PLO_ISLEADER: marks this session as the level's leader (first player
/// in, responsible for NPC-trigger authority).
pub fn build_is_leader(buf: &mut BytesMut) {
    buf.put_u8(code(PacketTypeOut::IsLeader));
    buf.put_u8(b'\n');
}

/// PLO_FILEUPTODATE: answers `wantfile`/`updatefile` when the client's
/// cached copy (by modtime) is still current, so no resend is needed.
pub fn build_file_up_to_date(buf: &mut BytesMut, name: &str) {
    buf.put_u8(code(PacketTypeOut::FileUpToDate));
    write_gstring(buf, name);
    buf.put_u8(b'\n');
}

/// PLO_FILESENDFAILED: answers `wantfile`/`updatefile` for a name the
/// catalogue has no entry for.
pub fn build_file_send_failed(buf: &mut BytesMut, name: &str) {
    buf.put_u8(code(PacketTypeOut::FileSendFailed));
    write_gstring(buf, name);
    buf.put_u8(b'\n');
}

/// PLO_RAWDATA + PLO_FILE: announces the byte count, then the file's
/// contents verbatim. Mirrors [`build_raw_data`]'s two-part raw-follows
/// framing since file bytes may themselves contain `\n`.
pub fn build_file_data(buf: &mut BytesMut, data: &[u8]) {
    buf.put_u8(code(PacketTypeOut::File));
    buf.put_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_name_is_gchar_encoded_and_newline_terminated() {
        let mut buf = BytesMut::new();
        build_level_name(&mut buf, "onlinestartlocal.nw");
        assert_eq!(buf[0], PacketTypeOut::LevelName.as_u8() + 32);
        assert_eq!(*buf.last().unwrap(), b'\n');
    }

    #[test]
    fn player_warp_halves_pixel_coordinates_into_halftiles() {
        let mut buf = BytesMut::new();
        build_player_warp(&mut buf, 64, 128, "level1.nw");
        let x = read_gchar(&mut buf.split_to(2).split_off(1)).unwrap();
        assert_eq!(x, 8); // 64 / 8
    }

    #[test]
    fn clear_weapons_has_no_payload() {
        let mut buf = BytesMut::new();
        build_clear_weapons(&mut buf);
        assert_eq!(buf.len(), 2); // code byte + newline
    }

    #[test]
    fn file_up_to_date_and_send_failed_carry_the_name() {
        let mut ok = BytesMut::new();
        build_file_up_to_date(&mut ok, "weapon1.txt");
        assert_eq!(ok[0], PacketTypeOut::FileUpToDate.as_u8() + 32);
        assert_eq!(*ok.last().unwrap(), b'\n');

        let mut failed = BytesMut::new();
        build_file_send_failed(&mut failed, "missing.nw");
        assert_eq!(failed[0], PacketTypeOut::FileSendFailed.as_u8() + 32);
    }

    #[test]
    fn file_data_is_code_byte_plus_verbatim_payload() {
        let payload: &[u8] = b"GLEVNW01\nraw bytes\x00\n";
        let mut buf = BytesMut::new();
        build_file_data(&mut buf, payload);
        assert_eq!(buf[0], PacketTypeOut::File.as_u8() + 32);
        assert_eq!(&buf[1..], payload); // not re-terminated or otherwise altered
    }
}
