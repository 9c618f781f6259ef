//! Message catalog
//!
//! Every message type, its fields, and their wire order. Field order is part
//! of the contract: `encode` and `decode` visit fields top to bottom.
//!
//! Notation used in the field docs below: `varint` is a
//! [`CompressedUnsigned`] field, `[T]` a varint-counted sequence, `vec3` three
//! `f32`, `quat` four `f32` (`w, x, y, z`). Every other integer is fixed width,
//! little-endian.

use std::fmt;

use super::codec::{Decode, Encode, Reader, Writer};
use super::math::{Quaternion, Vec3};
use super::varint::CompressedUnsigned;
use super::{MessageTag, Result};

/// Varint-encoded `u32` (counts, entity and resource IDs)
pub type VarU32 = CompressedUnsigned<u32>;

/// A catalog message type.
pub trait Message: Encode + Decode + fmt::Debug + Send + Sync + 'static {
    /// Wire tag of this type
    const TAG: MessageTag;

    /// Stable catalog name
    #[must_use]
    fn name() -> &'static str {
        Self::TAG.name()
    }
}

/// Declares a record whose fields encode in declaration order.
macro_rules! record {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            $( $(#[$field_meta])* pub $field: $ty, )*
        }

        impl Encode for $name {
            #[allow(unused_variables)]
            fn encode(&self, writer: &mut Writer) -> Result<()> {
                $( writer.put(&self.$field)?; )*
                Ok(())
            }
        }

        impl Decode for $name {
            #[allow(unused_variables)]
            fn decode(reader: &mut Reader<'_>) -> Result<Self> {
                Ok(Self {
                    $( $field: reader.read()?, )*
                })
            }
        }
    };
}

/// Declares a record that is also a top-level message bound to its tag.
macro_rules! message {
    (
        $(#[$meta:meta])*
        $name:ident { $($body:tt)* }
    ) => {
        record! {
            $(#[$meta])*
            $name { $($body)* }
        }

        impl Message for $name {
            const TAG: MessageTag = MessageTag::$name;
        }
    };
}

// Arena resources

record! {
    /// Entry of [`ArenaList`]
    ArenaInfo {
        /// Display name
        arena_name: String,
    }
}

message! {
    /// Arenas the player can join: `[arena]`
    ArenaList {
        /// Available arenas, indexed by `JoinArena::arena_index`
        arenas: Vec<ArenaInfo>,
    }
}

record! {
    /// Particle group reference inside a [`ParticleSystem`]
    ParticleGroup {
        /// Interned string ID of the group name
        particle_group_name_id: VarU32,
    }
}

record! {
    /// Particle system made of named groups
    ParticleSystem {
        /// Groups composing the system
        particle_groups: Vec<ParticleGroup>,
    }
}

message! {
    /// Interned batch of particle systems: `start_id: varint, [system]`
    ArenaParticleSystems {
        /// ID of the first system in the batch
        start_id: VarU32,
        /// Systems, IDs assigned sequentially from `start_id`
        particle_systems: Vec<ParticleSystem>,
    }
}

record! {
    /// Model placed by a prefab
    PrefabModel {
        /// Interned string ID of the model path
        model_id: VarU32,
        /// Local rotation
        rotation: Quaternion,
        /// Local position
        position: Vec3,
        /// Local scale
        scale: Vec3,
    }
}

record! {
    /// Sound placed by a prefab
    PrefabSound {
        /// Sound ID from [`ArenaSounds`]
        sound_id: VarU32,
        /// Local position
        position: Vec3,
    }
}

record! {
    /// Visual effect placed by a prefab
    PrefabVisualEffect {
        /// Interned string ID of the effect name
        effect_name_id: VarU32,
        /// Local rotation
        rotation: Quaternion,
        /// Local position
        position: Vec3,
        /// Local scale
        scale: Vec3,
    }
}

/// Prefab assembled from models, sounds and visual effects.
///
/// Unlike plain records, the three counts are written up front, followed by
/// the three element runs:
///
/// ```text
/// model_count: varint, sound_count: varint, effect_count: varint,
/// model*, sound*, effect*
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefab {
    /// Models
    pub models: Vec<PrefabModel>,
    /// Sounds
    pub sounds: Vec<PrefabSound>,
    /// Visual effects
    pub visual_effects: Vec<PrefabVisualEffect>,
}

impl Encode for Prefab {
    fn encode(&self, writer: &mut Writer) -> Result<()> {
        let max = writer.limits().max_sequence_len;
        writer.put_len("sequence", self.models.len(), max)?;
        writer.put_len("sequence", self.sounds.len(), max)?;
        writer.put_len("sequence", self.visual_effects.len(), max)?;

        for model in &self.models {
            writer.put(model)?;
        }
        for sound in &self.sounds {
            writer.put(sound)?;
        }
        for effect in &self.visual_effects {
            writer.put(effect)?;
        }
        Ok(())
    }
}

impl Decode for Prefab {
    fn decode(reader: &mut Reader<'_>) -> Result<Self> {
        let max = reader.limits().max_sequence_len;
        let model_count = reader.read_len("sequence", max)?;
        let sound_count = reader.read_len("sequence", max)?;
        let effect_count = reader.read_len("sequence", max)?;

        Ok(Self {
            models: read_run(reader, model_count)?,
            sounds: read_run(reader, sound_count)?,
            visual_effects: read_run(reader, effect_count)?,
        })
    }
}

fn read_run<T: Decode>(reader: &mut Reader<'_>, count: usize) -> Result<Vec<T>> {
    let mut items = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        items.push(reader.read()?);
    }
    Ok(items)
}

message! {
    /// Interned batch of prefabs: `start_id: varint, [prefab]`
    ArenaPrefabs {
        /// ID of the first prefab in the batch
        start_id: VarU32,
        /// Prefabs, IDs assigned sequentially from `start_id`
        prefabs: Vec<Prefab>,
    }
}

record! {
    /// Sound file entry of [`ArenaSounds`]
    SoundInfo {
        /// Path of the sound file
        file_path: String,
    }
}

message! {
    /// Interned batch of sounds: `start_id: varint, [file_path: string]`
    ArenaSounds {
        /// ID of the first sound in the batch
        start_id: VarU32,
        /// Sounds, IDs assigned sequentially from `start_id`
        sounds: Vec<SoundInfo>,
    }
}

// Arena simulation

record! {
    /// Snapshot of one entity inside [`ArenaState`]
    EntityState {
        /// Entity ID
        id: VarU32,
        /// World position
        position: Vec3,
        /// World rotation
        rotation: Quaternion,
        /// Angular velocity
        angular_velocity: Vec3,
        /// Linear velocity
        linear_velocity: Vec3,
    }
}

message! {
    /// Periodic world snapshot. Sent unreliably; receivers drop anything not
    /// newer than the last applied `state_id` (see [`ArenaState::is_newer_than`]).
    ///
    /// `state_id: u16, server_time: u64, last_processed_input_time: u64, [entity]`
    ArenaState {
        /// Wrapping snapshot sequence number
        state_id: u16,
        /// Server clock when the snapshot was taken
        server_time: u64,
        /// `input_time` of the last [`PlayerMovement`] applied
        last_processed_input_time: u64,
        /// Entity snapshots
        entities: Vec<EntityState>,
    }
}

impl ArenaState {
    /// Wrapping comparison of `state_id` against the last applied one.
    #[must_use]
    pub fn is_newer_than(&self, last_state_id: u16) -> bool {
        let (current, last) = (self.state_id, last_state_id);
        (current > last && current - last <= 32_768) || (current < last && last - current > 32_768)
    }
}

message! {
    /// Server-side bot report: `message_type: u8, error_message: string`
    BotMessage {
        /// Bot message kind
        message_type: u8,
        /// Error text, empty for informational messages
        error_message: String,
    }
}

message! {
    /// Chat line broadcast to players
    ChatMessage {
        /// Formatted text
        message: String,
    }
}

message! {
    /// Hands control of an entity to the receiving player
    ControlEntity {
        /// Entity ID
        id: VarU32,
    }
}

message! {
    /// Spawns an entity on the client
    CreateEntity {
        /// Initial angular velocity
        angular_velocity: Vec3,
        /// Entity ID
        entity_id: VarU32,
        /// Initial linear velocity
        linear_velocity: Vec3,
        /// Initial position
        position: Vec3,
        /// Prefab ID from [`ArenaPrefabs`]
        prefab_id: VarU32,
        /// Initial rotation
        rotation: Quaternion,
        /// Name rendered above the entity
        visual_name: String,
    }
}

message! {
    /// Removes an entity on the client
    DeleteEntity {
        /// Entity ID
        id: VarU32,
    }
}

message! {
    /// Damage state of the controlled entity
    IntegrityUpdate {
        /// Integrity, 0 (destroyed) to 255 (intact)
        integrity_value: u8,
    }
}

message! {
    /// Particle system spawn
    InstantiateParticleSystem {
        /// System ID from [`ArenaParticleSystems`]
        particle_system_id: VarU32,
        /// World rotation
        rotation: Quaternion,
        /// World position
        position: Vec3,
        /// Scale
        scale: Vec3,
    }
}

message! {
    /// One-shot sound playback
    PlaySound {
        /// Sound ID from [`ArenaSounds`]
        sound_id: VarU32,
        /// World position
        position: Vec3,
    }
}

message! {
    /// Interned batch of plain strings: `start_id: varint, [string]`
    NetworkStrings {
        /// ID of the first string in the batch
        start_id: VarU32,
        /// Strings, IDs assigned sequentially from `start_id`
        strings: Vec<String>,
    }
}

// Spaceship management

record! {
    /// Module chosen for a hull slot
    ModuleSelection {
        /// Slot module type
        module_type: u8,
        /// Selected module
        module_id: VarU32,
    }
}

message! {
    /// `hull_id: varint, spaceship_name: string, spaceship_code: string, [module]`
    CreateSpaceship {
        /// Hull from [`HullList`]
        hull_id: VarU32,
        /// Unique (per owner) spaceship name
        spaceship_name: String,
        /// Script source
        spaceship_code: String,
        /// Module for each hull slot
        modules: Vec<ModuleSelection>,
    }
}

message! {
    /// Creation rejected
    CreateSpaceshipFailure {
        /// Failure reason code
        reason: u8,
    }
}

message! {
    /// Creation accepted
    CreateSpaceshipSuccess {}
}

message! {
    /// Deletes one of the player's spaceships
    DeleteSpaceship {
        /// Spaceship name
        spaceship_name: String,
    }
}

message! {
    /// Deletion rejected
    DeleteSpaceshipFailure {
        /// Failure reason code
        reason: u8,
    }
}

message! {
    /// Deletion accepted
    DeleteSpaceshipSuccess {}
}

record! {
    /// Slot of a hull
    HullSlot {
        /// Module type the slot accepts
        module_type: u8,
    }
}

record! {
    /// Hull description inside [`HullList`]
    HullInfo {
        /// Hull ID
        hull_id: VarU32,
        /// Interned string ID of the hull model path
        hull_model_path_id: VarU32,
        /// Display name
        name: String,
        /// Description text
        description: String,
        /// Module slots
        slots: Vec<HullSlot>,
    }
}

message! {
    /// Available hulls
    HullList {
        /// Hulls
        hulls: Vec<HullInfo>,
    }
}

record! {
    /// Module available for a type
    ModuleInfo {
        /// Module ID
        module_id: VarU32,
        /// Display name
        module_name: String,
    }
}

record! {
    /// Modules grouped by type inside [`ModuleList`]
    ModuleTypeInfo {
        /// Module type
        module_type: u8,
        /// Modules of that type
        available_modules: Vec<ModuleInfo>,
    }
}

message! {
    /// Available modules per type
    ModuleList {
        /// Groups
        modules: Vec<ModuleTypeInfo>,
    }
}

message! {
    /// Requests details about one spaceship
    QuerySpaceshipInfo {
        /// Spaceship name
        spaceship_name: String,
    }
}

record! {
    /// Module fitted on a spaceship
    SpaceshipModuleInfo {
        /// Fitted module ID
        current_module: VarU32,
        /// Module type
        module_type: u8,
    }
}

message! {
    /// Answer to [`QuerySpaceshipInfo`]
    SpaceshipInfo {
        /// Hull ID
        hull_id: VarU32,
        /// Hull model path
        hull_model_path: String,
        /// Fitted modules
        modules: Vec<SpaceshipModuleInfo>,
    }
}

record! {
    /// Entry of [`SpaceshipList`]
    SpaceshipListEntry {
        /// Spaceship name
        name: String,
    }
}

message! {
    /// The player's spaceships
    SpaceshipList {
        /// Spaceships
        spaceships: Vec<SpaceshipListEntry>,
    }
}

record! {
    /// Module swap inside [`UpdateSpaceship`]
    ModifiedModule {
        /// New module name
        module_name: String,
        /// Replaced module name
        old_module_name: String,
        /// Module type
        module_type: u8,
    }
}

message! {
    /// Renames a spaceship, replaces its code and swaps modules
    UpdateSpaceship {
        /// Current name
        spaceship_name: String,
        /// New name, empty to keep
        new_spaceship_name: String,
        /// New script source, empty to keep
        new_spaceship_code: String,
        /// Module swaps
        modified_modules: Vec<ModifiedModule>,
    }
}

message! {
    /// Update rejected
    UpdateSpaceshipFailure {
        /// Failure reason code
        reason: u8,
    }
}

message! {
    /// Update accepted
    UpdateSpaceshipSuccess {}
}

// Session and account

message! {
    /// Enters the arena at `arena_index` in [`ArenaList`]
    JoinArena {
        /// Arena index
        arena_index: u8,
    }
}

message! {
    /// Leaves the current arena
    LeaveArena {}
}

message! {
    /// Password login: `login: string, password_hash: string, generate_connection_token: u8`
    Login {
        /// Account login
        login: String,
        /// Client-side password hash
        password_hash: String,
        /// Ask the server for a reconnection token
        generate_connection_token: bool,
    }
}

message! {
    /// Token login: `[token byte], generate_connection_token: u8`
    LoginByToken {
        /// Token previously issued in [`LoginSuccess`]
        connection_token: Vec<u8>,
        /// Ask the server for a fresh token
        generate_connection_token: bool,
    }
}

message! {
    /// Login rejected
    LoginFailure {
        /// Failure reason code
        reason: u8,
    }
}

message! {
    /// Login accepted
    LoginSuccess {
        /// Reconnection token, empty unless requested
        connection_token: Vec<u8>,
    }
}

message! {
    /// Chat line typed by the player
    PlayerChat {
        /// Raw text
        text: String,
    }
}

message! {
    /// Player input sample
    PlayerMovement {
        /// Client clock of the sample
        input_time: u64,
        /// Thrust direction
        direction: Vec3,
        /// Rotation input
        rotation: Vec3,
    }
}

message! {
    /// Fire request
    PlayerShoot {}
}

message! {
    /// Requests [`ArenaList`]
    QueryArenaList {}
}

message! {
    /// Requests [`HullList`]
    QueryHullList {}
}

message! {
    /// Requests [`ModuleList`]
    QueryModuleList {}
}

message! {
    /// Requests [`SpaceshipList`]
    QuerySpaceshipList {}
}

message! {
    /// Account creation
    Register {
        /// Account login
        login: String,
        /// Contact address
        email: String,
        /// Client-side password hash
        password_hash: String,
    }
}

message! {
    /// Registration rejected
    RegisterFailure {
        /// Failure reason code
        reason: u8,
    }
}

message! {
    /// Registration accepted
    RegisterSuccess {}
}

message! {
    /// Clock sync request: `request_id: u32`
    TimeSyncRequest {
        /// Echoed back in the response
        request_id: u32,
    }
}

message! {
    /// Clock sync answer: `request_id: u32, server_time: u64`
    TimeSyncResponse {
        /// ID from the request
        request_id: u32,
        /// Server clock in milliseconds
        server_time: u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec::{decode, encode};
    use crate::protocol::Error;

    fn roundtrip<M: Message + PartialEq>(message: &M) {
        let bytes = encode(message).unwrap();
        assert_eq!(bytes[0], M::TAG.as_u8());
        let decoded: M = decode(&bytes).unwrap();
        assert_eq!(&decoded, message);
    }

    #[test]
    fn test_time_sync_layout() {
        let bytes = encode(&TimeSyncRequest { request_id: 7 }).unwrap();
        assert_eq!(bytes.as_ref(), [MessageTag::TimeSyncRequest.as_u8(), 7, 0, 0, 0]);
    }

    #[test]
    fn test_network_strings_layout() {
        let batch = NetworkStrings {
            start_id: VarU32::new(200),
            strings: vec!["a".into(), "bc".into()],
        };
        let bytes = encode(&batch).unwrap();
        assert_eq!(
            bytes.as_ref(),
            [MessageTag::NetworkStrings.as_u8(), 0xC8, 0x01, 2, 1, b'a', 2, b'b', b'c']
        );
        roundtrip(&batch);
    }

    #[test]
    fn test_create_spaceship_layout() {
        let message = CreateSpaceship {
            hull_id: VarU32::new(1),
            spaceship_name: "x".into(),
            spaceship_code: String::new(),
            modules: vec![ModuleSelection {
                module_type: 3,
                module_id: VarU32::new(130),
            }],
        };
        let bytes = encode(&message).unwrap();
        assert_eq!(
            bytes.as_ref(),
            [MessageTag::CreateSpaceship.as_u8(), 1, 1, b'x', 0, 1, 3, 0x82, 0x01]
        );
        roundtrip(&message);
    }

    #[test]
    fn test_arena_state_roundtrip() {
        let state = ArenaState {
            state_id: 65_535,
            server_time: 1_000,
            last_processed_input_time: 990,
            entities: vec![
                EntityState {
                    id: VarU32::new(1),
                    position: Vec3::new(1.0, 2.0, 3.0),
                    rotation: Quaternion::IDENTITY,
                    angular_velocity: Vec3::ZERO,
                    linear_velocity: Vec3::new(0.5, 0.0, -0.5),
                },
                EntityState::default(),
            ],
        };
        let bytes = encode(&state).unwrap();
        // tag + 2 + 8 + 8 + count + 2 * (id + 52 bytes of floats)
        assert_eq!(bytes.len(), 1 + 2 + 8 + 8 + 1 + 2 * (1 + 52));
        roundtrip(&state);
    }

    #[test]
    fn test_arena_state_freshness_wraps() {
        let state = ArenaState {
            state_id: 2,
            ..ArenaState::default()
        };
        assert!(state.is_newer_than(1));
        assert!(state.is_newer_than(65_000));
        assert!(!state.is_newer_than(2));
        assert!(!state.is_newer_than(3));
    }

    #[test]
    fn test_prefab_counts_come_first() {
        let batch = ArenaPrefabs {
            start_id: VarU32::new(0),
            prefabs: vec![Prefab {
                models: vec![PrefabModel::default()],
                sounds: vec![PrefabSound::default(), PrefabSound::default()],
                visual_effects: Vec::new(),
            }],
        };
        let bytes = encode(&batch).unwrap();
        // tag, start_id, prefab count, then the three element counts
        assert_eq!(&bytes[..6], [MessageTag::ArenaPrefabs.as_u8(), 0, 1, 1, 2, 0]);
        roundtrip(&batch);
    }

    #[test]
    fn test_empty_messages_are_tag_only() {
        assert_eq!(encode(&PlayerShoot {}).unwrap().len(), 1);
        assert_eq!(encode(&QueryHullList {}).unwrap().len(), 1);
        roundtrip(&LeaveArena {});
    }

    #[test]
    fn test_nested_truncation_returns_no_partial_value() {
        let list = HullList {
            hulls: vec![HullInfo {
                hull_id: VarU32::new(4),
                hull_model_path_id: VarU32::new(9),
                name: "Scout".into(),
                description: "Light hull".into(),
                slots: vec![HullSlot { module_type: 1 }, HullSlot { module_type: 2 }],
            }],
        };
        let bytes = encode(&list).unwrap();
        for cut in 1..bytes.len() {
            let result = decode::<HullList>(&bytes[..cut]);
            assert!(matches!(result, Err(Error::Truncated { .. })), "cut {cut}");
        }
    }

    #[test]
    fn test_login_roundtrips() {
        roundtrip(&Login {
            login: "pilot".into(),
            password_hash: "ab12".into(),
            generate_connection_token: true,
        });
        roundtrip(&LoginByToken {
            connection_token: vec![1, 2, 3, 255],
            generate_connection_token: false,
        });
        roundtrip(&LoginSuccess {
            connection_token: vec![9; 32],
        });
    }

    /// Round-trips messages and remembers which tags were seen.
    #[derive(Default)]
    struct Coverage {
        seen: std::collections::BTreeSet<MessageTag>,
    }

    impl Coverage {
        fn check<M: Message + PartialEq>(&mut self, message: M) -> &mut Self {
            roundtrip(&message);
            assert!(self.seen.insert(M::TAG), "{} checked twice", M::TAG);
            self
        }
    }

    fn v(id: u32) -> VarU32 {
        VarU32::new(id)
    }

    #[test]
    fn test_every_catalog_message_roundtrips() {
        let pos = Vec3::new(1.5, -2.0, 300.25);
        let rot = Quaternion::new(0.5, -0.5, 0.5, -0.5);
        let scale = Vec3::new(2.0, 2.0, 0.5);
        let mut coverage = Coverage::default();

        coverage
            .check(ArenaList {
                arenas: vec![ArenaInfo { arena_name: "Ring".into() }, ArenaInfo::default()],
            })
            .check(ArenaParticleSystems {
                start_id: v(12),
                particle_systems: vec![ParticleSystem {
                    particle_groups: vec![
                        ParticleGroup { particle_group_name_id: v(3) },
                        ParticleGroup { particle_group_name_id: v(40_000) },
                    ],
                }],
            })
            .check(ArenaPrefabs {
                start_id: v(7),
                prefabs: vec![Prefab {
                    models: vec![PrefabModel {
                        model_id: v(1),
                        rotation: rot,
                        position: pos,
                        scale,
                    }],
                    sounds: vec![PrefabSound { sound_id: v(2), position: pos }],
                    visual_effects: vec![PrefabVisualEffect {
                        effect_name_id: v(300),
                        rotation: rot,
                        position: pos,
                        scale,
                    }],
                }],
            })
            .check(ArenaSounds {
                start_id: v(128),
                sounds: vec![SoundInfo { file_path: "sfx/boom.wav".into() }],
            })
            .check(ArenaState {
                state_id: 513,
                server_time: u64::MAX,
                last_processed_input_time: 17,
                entities: vec![EntityState {
                    id: v(9),
                    position: pos,
                    rotation: rot,
                    angular_velocity: scale,
                    linear_velocity: pos,
                }],
            })
            .check(BotMessage {
                message_type: 2,
                error_message: "stuck".into(),
            })
            .check(ChatMessage { message: "gg".into() })
            .check(ControlEntity { id: v(77) })
            .check(CreateEntity {
                angular_velocity: scale,
                entity_id: v(5),
                linear_velocity: pos,
                position: pos,
                prefab_id: v(6),
                rotation: rot,
                visual_name: "drone".into(),
            })
            .check(CreateSpaceship {
                hull_id: v(2),
                spaceship_name: "Kestrel".into(),
                spaceship_code: "K-1".into(),
                modules: vec![ModuleSelection { module_type: 1, module_id: v(4) }],
            })
            .check(CreateSpaceshipFailure { reason: 3 })
            .check(CreateSpaceshipSuccess {})
            .check(DeleteEntity { id: v(1 << 20) })
            .check(DeleteSpaceship { spaceship_name: "Kestrel".into() })
            .check(DeleteSpaceshipFailure { reason: 1 })
            .check(DeleteSpaceshipSuccess {})
            .check(HullList {
                hulls: vec![HullInfo {
                    hull_id: v(1),
                    hull_model_path_id: v(2),
                    name: "Scout".into(),
                    description: "fast".into(),
                    slots: vec![HullSlot { module_type: 4 }],
                }],
            })
            .check(InstantiateParticleSystem {
                particle_system_id: v(8),
                rotation: rot,
                position: pos,
                scale,
            })
            .check(IntegrityUpdate { integrity_value: 55 })
            .check(JoinArena { arena_index: 3 })
            .check(LeaveArena {})
            .check(Login {
                login: "pilot".into(),
                password_hash: "ff00".into(),
                generate_connection_token: true,
            })
            .check(LoginByToken {
                connection_token: vec![0, 1, 254, 255],
                generate_connection_token: true,
            })
            .check(LoginFailure { reason: 2 })
            .check(LoginSuccess { connection_token: vec![7; 16] })
            .check(ModuleList {
                modules: vec![ModuleTypeInfo {
                    module_type: 2,
                    available_modules: vec![ModuleInfo {
                        module_id: v(11),
                        module_name: "Shield".into(),
                    }],
                }],
            })
            .check(NetworkStrings {
                start_id: v(1_000),
                strings: vec!["alpha".into(), String::new(), "\u{e9}t\u{e9}".into()],
            })
            .check(PlayerChat { text: "hello".into() })
            .check(PlayerMovement {
                input_time: 123_456,
                direction: pos,
                rotation: scale,
            })
            .check(PlayerShoot {})
            .check(PlaySound { sound_id: v(4), position: pos })
            .check(QueryArenaList {})
            .check(QueryHullList {})
            .check(QueryModuleList {})
            .check(QuerySpaceshipInfo { spaceship_name: "Kestrel".into() })
            .check(QuerySpaceshipList {})
            .check(Register {
                login: "pilot".into(),
                email: "pilot@example.org".into(),
                password_hash: "ff00".into(),
            })
            .check(RegisterFailure { reason: 4 })
            .check(RegisterSuccess {})
            .check(SpaceshipInfo {
                hull_id: v(3),
                hull_model_path: "models/hull3".into(),
                modules: vec![SpaceshipModuleInfo { current_module: v(12), module_type: 1 }],
            })
            .check(SpaceshipList {
                spaceships: vec![SpaceshipListEntry { name: "Kestrel".into() }],
            })
            .check(TimeSyncRequest { request_id: 99 })
            .check(TimeSyncResponse {
                request_id: 99,
                server_time: 1_700_000_000_000,
            })
            .check(UpdateSpaceship {
                spaceship_name: "Kestrel".into(),
                new_spaceship_name: "Osprey".into(),
                new_spaceship_code: "O-2".into(),
                modified_modules: vec![ModifiedModule {
                    module_name: "Laser".into(),
                    old_module_name: "Blaster".into(),
                    module_type: 3,
                }],
            })
            .check(UpdateSpaceshipFailure { reason: 5 })
            .check(UpdateSpaceshipSuccess {});

        let all: std::collections::BTreeSet<_> = MessageTag::ALL.into_iter().collect();
        assert_eq!(coverage.seen, all);
    }

    #[test]
    fn test_message_name() {
        assert_eq!(UpdateSpaceship::name(), "UpdateSpaceship");
        assert_eq!(ArenaSounds::TAG, MessageTag::ArenaSounds);
    }
}
