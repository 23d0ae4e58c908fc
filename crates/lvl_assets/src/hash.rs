//! Name hashing used by the level container.
//!
//! Names are hashed with 32-bit FNV-1a after folding ASCII letters to lower
//! case, so `GeometryName` and `geometryname` hash the same.

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

pub const fn fnv1a(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash = FNV_OFFSET;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= (bytes[i] | 0x20) as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Entity-class properties the importer knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    GeometryName,
    AttachOdf,
    AttachToHardpoint,
    AnimationName,
    Animation,
    SoldierCollision,
    OrdnanceCollision,
    OverrideTexture,
    FoleyFxGroup,
    Unknown(u32),
}

impl PropertyKind {
    pub const GEOMETRY_NAME: u32 = fnv1a("GeometryName");
    pub const ATTACH_ODF: u32 = fnv1a("AttachODF");
    pub const ATTACH_TO_HARDPOINT: u32 = fnv1a("AttachToHardpoint");
    pub const ANIMATION_NAME: u32 = fnv1a("AnimationName");
    pub const ANIMATION: u32 = fnv1a("Animation");
    pub const SOLDIER_COLLISION: u32 = fnv1a("SoldierCollision");
    pub const ORDNANCE_COLLISION: u32 = fnv1a("OrdnanceCollision");
    pub const OVERRIDE_TEXTURE: u32 = fnv1a("OverrideTexture");
    pub const FOLEY_FX_GROUP: u32 = fnv1a("FoleyFXGroup");

    pub fn from_hash(hash: u32) -> Self {
        match hash {
            Self::GEOMETRY_NAME => PropertyKind::GeometryName,
            Self::ATTACH_ODF => PropertyKind::AttachOdf,
            Self::ATTACH_TO_HARDPOINT => PropertyKind::AttachToHardpoint,
            Self::ANIMATION_NAME => PropertyKind::AnimationName,
            Self::ANIMATION => PropertyKind::Animation,
            Self::SOLDIER_COLLISION => PropertyKind::SoldierCollision,
            Self::ORDNANCE_COLLISION => PropertyKind::OrdnanceCollision,
            Self::OVERRIDE_TEXTURE => PropertyKind::OverrideTexture,
            Self::FOLEY_FX_GROUP => PropertyKind::FoleyFxGroup,
            other => PropertyKind::Unknown(other),
        }
    }
}
