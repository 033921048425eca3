//! Player property engine.
//!
//! Turns a raw `PLI_PLAYERPROPS` payload (a run of `{id}{value}` pairs) into updates against
//! a [`PlayerProperties`] struct, and turns a set of properties back into the same wire shape
//! for forwarding to other sessions. Every property id is gated: some may only ever be set by
//! the server, some are accepted from the client only if the new value is plausible, and the
//! rest are taken as-is.

use bytes::BytesMut;

use gserver_core::Result;
use gserver_protocol::codecs::*;

use crate::properties::{
    PlayerProp, PlayerProperties, PropertyAttachNPC, PropertyGaniOrBowGif, PropertyHeadGif,
    PropertySprite, PropertyShieldPower, PropertySwordPower,
};

/// Maximum length (bytes) accepted for a client-supplied nickname.
///
/// GSTRING lengths are single-byte, so 223 keeps room for the encoding's +32 offset without
/// touching the high end of the range.
const MAX_NICKNAME_LEN: usize = 223;

/// Who may set a property, and under what condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyGate {
    /// Only the server sets this one. A client-sent value is still decoded, to keep the rest
    /// of the packet aligned, but it is never applied.
    ServerOnly,
    /// The client may set it, but the new value is checked for plausibility first (e.g.
    /// clamped to a valid range) before being accepted.
    PlayerWritableIfPlausible,
    /// The client may set it outright.
    PlayerWritable,
}

/// Who a property change is forwarded to once it has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardClass {
    /// Not forwarded anywhere; the change is local bookkeeping only.
    None,
    /// Forwarded to the other players sharing the same level.
    LevelBroadcast,
    /// Forwarded to every connected player regardless of level.
    GlobalBroadcast,
}

/// One property that was decoded from an incoming packet and actually changed.
#[derive(Debug, Clone, Copy)]
pub struct AppliedProp {
    pub prop: PlayerProp,
    pub forward: ForwardClass,
}

/// Returns the write-gating policy for a property.
pub fn gate_for(prop: PlayerProp) -> PropertyGate {
    use PlayerProp::*;
    match prop {
        Id | AccountName | KillsCount | DeathsCount | OnlineSecs | OnlineSecs2 | IpAddr
        | Rating | Disconnect | AdditFlags | PlayerListStatus | PlayerListCategory
        | UdpPort | JoinLeaveLvl | ApCounter | Alignment => PropertyGate::ServerOnly,
        CurPower | MaxPower | X | Y | Z | X2 | Y2 | Z2 => PropertyGate::PlayerWritableIfPlausible,
        _ => PropertyGate::PlayerWritable,
    }
}

/// Returns who should hear about a property change once it is applied.
pub fn forward_class_for(prop: PlayerProp) -> ForwardClass {
    use PlayerProp::*;
    match prop {
        Language | OsType | TextCodePage => ForwardClass::None,
        Nickname | AccountName | CommunityName => ForwardClass::GlobalBroadcast,
        _ => ForwardClass::LevelBroadcast,
    }
}

/// Sanitizes a client-supplied nickname.
///
/// The legacy client-side convention of showing a guild affiliation as a `(Guild)` suffix on
/// the nickname is left to clients to render; the server only trims and bounds the raw string.
pub fn sanitize_nickname(raw: String) -> String {
    let trimmed = raw.trim().replace(['\r', '\n'], "");
    if trimmed.len() > MAX_NICKNAME_LEN {
        trimmed.chars().take(MAX_NICKNAME_LEN).collect()
    } else {
        trimmed
    }
}

/// Returns true if a chat line should be treated as a command rather than broadcast chat.
///
/// Lines starting with `#` are server/RC directives; everything else is ordinary level chat.
pub fn is_chat_command(text: &str) -> bool {
    text.starts_with('#')
}

/// Decodes every `{id}{value}` pair in `data`, applies the allowed ones to `props`, and
/// returns the properties that actually changed (for forwarding to other sessions).
///
/// Stops early if an unrecognized property id is encountered, since its value's width is
/// unknown and the rest of the payload can no longer be parsed reliably.
pub fn apply_incoming_props(props: &mut PlayerProperties, data: &[u8]) -> Result<Vec<AppliedProp>> {
    let mut buf = BytesMut::from(data);
    let mut applied = Vec::new();

    while !buf.is_empty() {
        let id = read_guchar(&mut buf)?;
        let Some(prop) = PlayerProp::from_u8(id) else {
            break;
        };

        let gate = gate_for(prop);
        if decode_and_apply_one(props, prop, &mut buf, gate)? {
            applied.push(AppliedProp { prop, forward: forward_class_for(prop) });
        }
    }

    Ok(applied)
}

/// The `setPropsRC` administrative variant of §4.6: decodes every `{id}{value}` pair in `data`
/// exactly as [`apply_incoming_props`] does, but bypasses each property's write-gate (including
/// `ServerOnly`) since the caller is a trusted RC operator rather than the player themselves.
/// Still clamps through each property's own decoder (e.g. `u8`/`GSTRING` truncation), since those
/// aren't player-write checks, just wire-format bounds.
///
/// `operator` is the RC account name that issued the change, recorded for the audit log per
/// spec §4.6 ("records which RC operator did it"); this function does not persist that anywhere
/// itself, it only logs it — the caller owns where that audit trail lives.
pub fn apply_incoming_props_rc(
    props: &mut PlayerProperties,
    data: &[u8],
    operator: &str,
) -> Result<Vec<AppliedProp>> {
    let mut buf = BytesMut::from(data);
    let mut applied = Vec::new();

    while !buf.is_empty() {
        let id = read_guchar(&mut buf)?;
        let Some(prop) = PlayerProp::from_u8(id) else {
            break;
        };

        if decode_and_apply_one(props, prop, &mut buf, PropertyGate::PlayerWritable)? {
            tracing::info!("RC operator {} set property {:?}", operator, prop);
            applied.push(AppliedProp { prop, forward: forward_class_for(prop) });
        }
    }

    Ok(applied)
}

fn decode_and_apply_one(
    props: &mut PlayerProperties,
    prop: PlayerProp,
    buf: &mut BytesMut,
    gate: PropertyGate,
) -> Result<bool> {
    use PlayerProp::*;

    let writable = gate != PropertyGate::ServerOnly;
    let mut changed = false;

    match prop {
        Nickname => {
            let raw = read_gstring(buf)?;
            if writable {
                props.nickname = sanitize_nickname(raw);
                changed = true;
            }
        }
        MaxPower => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.max_power = v;
                if props.cur_power > props.max_power {
                    props.cur_power = props.max_power;
                }
                changed = true;
            }
        }
        CurPower => {
            let v = read_gchar(buf)? as u8;
            if writable {
                let clamped = v.min(props.max_power);
                changed = clamped != props.cur_power;
                props.cur_power = clamped;
            }
        }
        RupeesCount => {
            let v = read_gint(buf)? as u32;
            if writable {
                props.rupees_count = v;
                changed = true;
            }
        }
        ArrowsCount => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.arrows_count = v;
                changed = true;
            }
        }
        BombsCount => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.bombs_count = v;
                changed = true;
            }
        }
        GlovePower => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.glove_power = v;
                changed = true;
            }
        }
        BombPower => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.bomb_power = v;
                changed = true;
            }
        }
        SwordPower => {
            let power = read_gchar(buf)? as i8;
            let image = read_gstring(buf)?;
            if writable {
                props.sword_power = PropertySwordPower { image, power: Some(power) };
                changed = true;
            }
        }
        ShieldPower => {
            let power = read_gchar(buf)? as u8;
            let image = read_gstring(buf)?;
            if writable {
                props.shield_power = PropertyShieldPower { image, power: Some(power) };
                changed = true;
            }
        }
        Gani => {
            let name = read_gstring(buf)?;
            if writable {
                props.gani = PropertyGaniOrBowGif::Gani(name);
                changed = true;
            }
        }
        HeadGif => {
            let name = read_gstring(buf)?;
            if writable {
                props.head_gif = match name.as_bytes() {
                    [preset] => PropertyHeadGif::Preset(*preset),
                    _ => PropertyHeadGif::Image(name),
                };
                changed = true;
            }
        }
        CurChat => {
            let text = read_gstring(buf)?;
            if writable {
                changed = props.cur_chat != text;
                props.cur_chat = text;
            }
        }
        Colors => {
            let raw = read_gstring(buf)?;
            if writable {
                let bytes = raw.as_bytes();
                for (i, slot) in props.colors.iter_mut().enumerate() {
                    *slot = *bytes.get(i).unwrap_or(&0);
                }
                changed = true;
            }
        }
        Id => {
            let v = read_gint(buf)? as u16;
            if writable {
                changed = props.id != v;
                props.id = v;
            }
        }
        X => {
            let v = read_gchar(buf)? as i16;
            if writable {
                changed = props.x != v;
                props.x = v;
            }
        }
        Y => {
            let v = read_gchar(buf)? as i16;
            if writable {
                changed = props.y != v;
                props.y = v;
            }
        }
        Sprite => {
            let raw = read_gchar(buf)? as u8;
            if writable {
                props.sprite = PropertySprite { sprite: raw & 0xFC, direction: raw & 0x03 };
                changed = true;
            }
        }
        Status => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.status = v;
                changed = true;
            }
        }
        CarrySprite => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.carry_sprite = v;
                changed = true;
            }
        }
        CurLevel => {
            let v = read_gstring(buf)?;
            if writable {
                changed = props.cur_level != v;
                props.cur_level = v;
            }
        }
        HorseGif => {
            let v = read_gstring(buf)?;
            if writable {
                props.horse_gif = v;
                changed = true;
            }
        }
        HorseBushes => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.horse_bushes = v;
                changed = true;
            }
        }
        EffectColors => {
            let raw = read_gstring(buf)?;
            if writable {
                let bytes = raw.as_bytes();
                for (i, slot) in props.effect_colors.iter_mut().enumerate() {
                    *slot = *bytes.get(i).unwrap_or(&0);
                }
                changed = true;
            }
        }
        CarryNPC => {
            let v = read_gint(buf)? as u32;
            if writable {
                props.carry_npc = v;
                changed = true;
            }
        }
        ApCounter => {
            let v = read_gshort(buf)? as u16;
            if writable {
                props.ap_counter = v;
                changed = true;
            }
        }
        MagicPoints => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.magic_points = v.min(100);
                changed = true;
            }
        }
        KillsCount => {
            let v = read_gint(buf)? as u32;
            if writable {
                props.kills_count = v;
                changed = true;
            }
        }
        DeathsCount => {
            let v = read_gint(buf)? as u32;
            if writable {
                props.deaths_count = v;
                changed = true;
            }
        }
        OnlineSecs => {
            let v = read_gint(buf)? as u32;
            if writable {
                props.online_secs = v;
                changed = true;
            }
        }
        IpAddr => {
            let v = read_guint5(buf)? as i64;
            if writable {
                props.ip_addr = v;
                changed = true;
            }
        }
        UdpPort => {
            let v = read_gshort(buf)? as u32;
            if writable {
                props.udp_port = v;
                changed = true;
            }
        }
        Alignment => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.alignment = v;
                changed = true;
            }
        }
        AdditFlags => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.addit_flags = v;
                changed = true;
            }
        }
        AccountName => {
            let v = read_gstring(buf)?;
            if writable {
                props.account_name = v;
                changed = true;
            }
        }
        BodyImg => {
            let v = read_gstring(buf)?;
            if writable {
                props.body_img = v;
                changed = true;
            }
        }
        Rating => {
            let rating = read_gint(buf)?;
            let deviation = read_gint(buf)?;
            if writable {
                props.rating.rating = rating as f32;
                props.rating.deviation = deviation as f32;
                changed = true;
            }
        }
        GAttrib1 | GAttrib2 | GAttrib3 | GAttrib4 | GAttrib5 | GAttrib6 | GAttrib7 | GAttrib8
        | GAttrib9 | GAttrib10 | GAttrib11 | GAttrib12 | GAttrib13 | GAttrib14 | GAttrib15
        | GAttrib16 | GAttrib17 | GAttrib18 | GAttrib19 | GAttrib20 | GAttrib21 | GAttrib22
        | GAttrib23 | GAttrib24 | GAttrib25 | GAttrib26 | GAttrib27 | GAttrib28 | GAttrib29
        | GAttrib30 => {
            let v = read_gstring(buf)?;
            if writable {
                let index = gani_attrib_index(prop);
                props.set_gani_attrib(index, v);
                changed = true;
            }
        }
        AttachNPC => {
            let npc_id = read_gint(buf)? as u32;
            let type_code = read_gchar(buf)? as u8;
            if writable {
                props.attach_npc = PropertyAttachNPC { npc_id, type_code };
                changed = true;
            }
        }
        GmapLevelX => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.gmap_level_x = v;
                changed = true;
            }
        }
        GmapLevelY => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.gmap_level_y = v;
                changed = true;
            }
        }
        Z => {
            let v = read_gchar(buf)? as i16 - 50;
            if writable {
                changed = props.z != v;
                props.z = v;
            }
        }
        JoinLeaveLvl => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.join_leave_lvl = v;
                changed = true;
            }
        }
        Disconnect => {
            let v = read_gchar(buf)? != 0;
            if writable {
                props.disconnect = v;
                changed = true;
            }
        }
        Language => {
            let v = read_gstring(buf)?;
            if writable {
                props.language = v;
                changed = true;
            }
        }
        PlayerListStatus => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.player_list_status = v;
                changed = true;
            }
        }
        OsType => {
            let v = read_gstring(buf)?;
            if writable {
                props.os_type = v;
                changed = true;
            }
        }
        TextCodePage => {
            let v = read_gint(buf)? as u32;
            if writable {
                props.text_code_page = v;
                changed = true;
            }
        }
        OnlineSecs2 => {
            let v = read_guint5(buf)? as i64;
            if writable {
                props.online_secs2 = v;
                changed = true;
            }
        }
        X2 => {
            let v = read_gint(buf)? as i16;
            if writable {
                changed = props.x2 != v;
                props.x2 = v;
                props.x = v / 16;
            }
        }
        Y2 => {
            let v = read_gint(buf)? as i16;
            if writable {
                changed = props.y2 != v;
                props.y2 = v;
                props.y = v / 16;
            }
        }
        Z2 => {
            let v = read_gint(buf)? as i16;
            if writable {
                changed = props.z2 != v;
                props.z2 = v;
                props.z = v / 16;
            }
        }
        PlayerListCategory => {
            let v = read_gchar(buf)? as u8;
            if writable {
                props.player_list_category = v;
                changed = true;
            }
        }
        CommunityName => {
            let v = read_gstring(buf)?;
            if writable {
                props.community_name = v;
                changed = true;
            }
        }
        Unknown83 => {
            let _ = read_guint5(buf)?;
        }
        PlayerPropCount => unreachable!("PlayerPropCount is not a valid wire id"),
    }

    if changed {
        props.mod_times.mark_modified(prop);
    }

    Ok(changed)
}

fn gani_attrib_index(prop: PlayerProp) -> usize {
    use PlayerProp::*;
    match prop {
        GAttrib1 => 0, GAttrib2 => 1, GAttrib3 => 2, GAttrib4 => 3, GAttrib5 => 4,
        GAttrib6 => 5, GAttrib7 => 6, GAttrib8 => 7, GAttrib9 => 8, GAttrib10 => 9,
        GAttrib11 => 10, GAttrib12 => 11, GAttrib13 => 12, GAttrib14 => 13, GAttrib15 => 14,
        GAttrib16 => 15, GAttrib17 => 16, GAttrib18 => 17, GAttrib19 => 18, GAttrib20 => 19,
        GAttrib21 => 20, GAttrib22 => 21, GAttrib23 => 22, GAttrib24 => 23, GAttrib25 => 24,
        GAttrib26 => 25, GAttrib27 => 26, GAttrib28 => 27, GAttrib29 => 28, GAttrib30 => 29,
        _ => unreachable!("not a gani attribute property"),
    }
}

/// Encodes a single property's current value in wire form, appending `{id}{value}` to `out`.
///
/// Used both to build the initial `PLO_PLAYERPROPS` dump on login and to forward a changed
/// property to other sessions.
pub fn encode_prop(props: &PlayerProperties, prop: PlayerProp, out: &mut BytesMut) {
    use bytes::BufMut;
    use PlayerProp::*;

    out.put_u8(prop as u8);
    match prop {
        Nickname => write_gstring(out, &props.nickname),
        MaxPower => write_gchar(out, props.max_power as i8),
        CurPower => write_gchar(out, props.cur_power as i8),
        RupeesCount => write_gint(out, props.rupees_count as i32),
        ArrowsCount => write_gchar(out, props.arrows_count as i8),
        BombsCount => write_gchar(out, props.bombs_count as i8),
        GlovePower => write_gchar(out, props.glove_power as i8),
        BombPower => write_gchar(out, props.bomb_power as i8),
        SwordPower => {
            write_gchar(out, props.sword_power.power.unwrap_or(0));
            write_gstring(out, &props.sword_power.image);
        }
        ShieldPower => {
            write_gchar(out, props.shield_power.power.unwrap_or(0) as i8);
            write_gstring(out, &props.shield_power.image);
        }
        Gani => match &props.gani {
            PropertyGaniOrBowGif::Gani(name) => write_gstring(out, name),
            PropertyGaniOrBowGif::BowGif { gif, .. } => write_gstring(out, gif),
        },
        HeadGif => match &props.head_gif {
            PropertyHeadGif::Preset(id) => write_gstring(out, &(*id as char).to_string()),
            PropertyHeadGif::Image(name) => write_gstring(out, name),
        },
        CurChat => write_gstring(out, &props.cur_chat),
        Colors => {
            let s: String = props.colors.iter().map(|&b| b as char).collect();
            write_gstring(out, &s);
        }
        Id => write_gint(out, props.id as i32),
        X => write_gchar(out, props.x as i8),
        Y => write_gchar(out, props.y as i8),
        Sprite => write_gchar(out, ((props.sprite.sprite & 0xFC) | (props.sprite.direction & 0x03)) as i8),
        Status => write_gchar(out, props.status as i8),
        CarrySprite => write_gchar(out, props.carry_sprite as i8),
        CurLevel => write_gstring(out, &props.cur_level),
        HorseGif => write_gstring(out, &props.horse_gif),
        HorseBushes => write_gchar(out, props.horse_bushes as i8),
        EffectColors => {
            let s: String = props.effect_colors.iter().map(|&b| b as char).collect();
            write_gstring(out, &s);
        }
        CarryNPC => write_gint(out, props.carry_npc as i32),
        ApCounter => write_gshort(out, props.ap_counter as i16),
        MagicPoints => write_gchar(out, props.magic_points as i8),
        KillsCount => write_gint(out, props.kills_count as i32),
        DeathsCount => write_gint(out, props.deaths_count as i32),
        OnlineSecs => write_gint(out, props.online_secs as i32),
        IpAddr => write_guint5(out, props.ip_addr as u32),
        UdpPort => write_gshort(out, props.udp_port as i16),
        Alignment => write_gchar(out, props.alignment as i8),
        AdditFlags => write_gchar(out, props.addit_flags as i8),
        AccountName => write_gstring(out, &props.account_name),
        BodyImg => write_gstring(out, &props.body_img),
        Rating => {
            write_gint(out, props.rating.rating as i32);
            write_gint(out, props.rating.deviation as i32);
        }
        GAttrib1 | GAttrib2 | GAttrib3 | GAttrib4 | GAttrib5 | GAttrib6 | GAttrib7 | GAttrib8
        | GAttrib9 | GAttrib10 | GAttrib11 | GAttrib12 | GAttrib13 | GAttrib14 | GAttrib15
        | GAttrib16 | GAttrib17 | GAttrib18 | GAttrib19 | GAttrib20 | GAttrib21 | GAttrib22
        | GAttrib23 | GAttrib24 | GAttrib25 | GAttrib26 | GAttrib27 | GAttrib28 | GAttrib29
        | GAttrib30 => {
            let index = gani_attrib_index(prop);
            write_gstring(out, props.get_gani_attrib(index).unwrap_or(""));
        }
        AttachNPC => {
            write_gint(out, props.attach_npc.npc_id as i32);
            write_gchar(out, props.attach_npc.type_code as i8);
        }
        GmapLevelX => write_gchar(out, props.gmap_level_x as i8),
        GmapLevelY => write_gchar(out, props.gmap_level_y as i8),
        Z => write_gchar(out, (props.z + 50) as i8),
        JoinLeaveLvl => write_gchar(out, props.join_leave_lvl as i8),
        Disconnect => write_gchar(out, props.disconnect as i8),
        Language => write_gstring(out, &props.language),
        PlayerListStatus => write_gchar(out, props.player_list_status as i8),
        OsType => write_gstring(out, &props.os_type),
        TextCodePage => write_gint(out, props.text_code_page as i32),
        OnlineSecs2 => write_guint5(out, props.online_secs2 as u32),
        X2 => write_gint(out, props.x2 as i32),
        Y2 => write_gint(out, props.y2 as i32),
        Z2 => write_gint(out, props.z2 as i32),
        PlayerListCategory => write_gchar(out, props.player_list_category as i8),
        CommunityName => write_gstring(out, &props.community_name),
        Unknown83 => write_guint5(out, props.unknown_83 as u32),
        PlayerPropCount => unreachable!("PlayerPropCount is not a valid wire id"),
    }
}

/// Encodes a full `PLO_PLAYERPROPS` payload covering every property, for the initial dump
/// sent to a session right after login.
pub fn encode_all_props(props: &PlayerProperties) -> Vec<u8> {
    let mut out = BytesMut::new();
    for id in 0..(PlayerProp::PlayerPropCount as u8) {
        let prop = PlayerProp::from_u8(id).expect("id is within range");
        encode_prop(props, prop, &mut out);
    }
    out.to_vec()
}

/// Encodes just the given properties, for forwarding a partial update to other sessions.
pub fn encode_props(props: &PlayerProperties, ids: &[PlayerProp]) -> Vec<u8> {
    let mut out = BytesMut::new();
    for &prop in ids {
        encode_prop(props, prop, &mut out);
    }
    out.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_writable_property() {
        let mut props = PlayerProperties::new();
        let mut data = BytesMut::new();
        data.extend_from_slice(&[PlayerProp::ArrowsCount as u8]);
        write_gchar(&mut data, 10);

        let applied = apply_incoming_props(&mut props, &data).unwrap();
        assert_eq!(props.arrows_count, 10);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].prop, PlayerProp::ArrowsCount);
    }

    #[test]
    fn server_only_property_is_parsed_but_ignored() {
        let mut props = PlayerProperties::new();
        let mut data = BytesMut::new();
        data.extend_from_slice(&[PlayerProp::KillsCount as u8]);
        write_gint(&mut data, 999);

        let applied = apply_incoming_props(&mut props, &data).unwrap();
        assert_eq!(props.kills_count, 0);
        assert!(applied.is_empty());
    }

    #[test]
    fn cur_power_is_clamped_to_max_power() {
        let mut props = PlayerProperties::new();
        props.max_power = 10;

        let mut data = BytesMut::new();
        data.extend_from_slice(&[PlayerProp::CurPower as u8]);
        write_gchar(&mut data, 40); // way above max

        let applied = apply_incoming_props(&mut props, &data).unwrap();
        assert_eq!(props.cur_power, 10);
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn nickname_is_sanitized() {
        assert_eq!(sanitize_nickname("  Hero\n".to_string()), "Hero");
        let long = "x".repeat(300);
        assert_eq!(sanitize_nickname(long).len(), MAX_NICKNAME_LEN);
    }

    #[test]
    fn chat_command_detection() {
        assert!(is_chat_command("#kick somebody"));
        assert!(!is_chat_command("hello there"));
    }

    #[test]
    fn gani_attrib_round_trips() {
        let mut props = PlayerProperties::new();
        let mut data = BytesMut::new();
        data.extend_from_slice(&[PlayerProp::GAttrib5 as u8]);
        write_gstring(&mut data, "run");

        apply_incoming_props(&mut props, &data).unwrap();
        assert_eq!(props.get_gani_attrib(4), Some("run"));
    }

    #[test]
    fn rc_bypass_applies_server_only_property() {
        let mut props = PlayerProperties::new();
        let mut data = BytesMut::new();
        data.extend_from_slice(&[PlayerProp::KillsCount as u8]);
        write_gint(&mut data, 999);

        // Same payload is dropped by the player-write path...
        let dropped = apply_incoming_props(&mut props, &data).unwrap();
        assert!(dropped.is_empty());
        assert_eq!(props.kills_count, 0);

        // ...but applied by the RC path.
        let applied = apply_incoming_props_rc(&mut props, &data, "admin").unwrap();
        assert_eq!(props.kills_count, 999);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].prop, PlayerProp::KillsCount);
    }

    #[test]
    fn full_dump_round_trips_through_apply() {
        let props = PlayerProperties::new();
        let dump = encode_all_props(&props);

        let mut applied_to = PlayerProperties::new();
        applied_to.nickname = "someone else".to_string();
        apply_incoming_props(&mut applied_to, &dump).unwrap();
        assert_eq!(applied_to.nickname, props.nickname);
        assert_eq!(applied_to.cur_level, props.cur_level);
    }
}
