//! Command tables for both peers
//!
//! The server receives account, hangar and input commands and sends world
//! state. The client table is the mirror image. Both tables bind every
//! catalog message exactly once, so a server registry and a client registry
//! built here share the same [`contract_fingerprint`].
//!
//! [`contract_fingerprint`]: super::CommandRegistry::contract_fingerprint

use std::sync::Arc;

use tracing::debug;

use super::ConnectionId;
use super::registry::{CommandRegistry, CommandRegistryBuilder};
use crate::protocol::message::{
    ArenaList,
    ArenaParticleSystems,
    ArenaPrefabs,
    ArenaSounds,
    ArenaState,
    BotMessage,
    ChatMessage,
    ControlEntity,
    CreateEntity,
    CreateSpaceship,
    CreateSpaceshipFailure,
    CreateSpaceshipSuccess,
    DeleteEntity,
    DeleteSpaceship,
    DeleteSpaceshipFailure,
    DeleteSpaceshipSuccess,
    HullList,
    InstantiateParticleSystem,
    IntegrityUpdate,
    JoinArena,
    LeaveArena,
    Login,
    LoginByToken,
    LoginFailure,
    LoginSuccess,
    ModuleList,
    NetworkStrings,
    PlaySound,
    PlayerChat,
    PlayerMovement,
    PlayerShoot,
    QueryArenaList,
    QueryHullList,
    QueryModuleList,
    QuerySpaceshipInfo,
    QuerySpaceshipList,
    Register,
    RegisterFailure,
    RegisterSuccess,
    SpaceshipInfo,
    SpaceshipList,
    TimeSyncRequest,
    TimeSyncResponse,
    UpdateSpaceship,
    UpdateSpaceshipFailure,
    UpdateSpaceshipSuccess,
};
use crate::protocol::{CodecLimits, DeliveryPolicy, Message, Result};

const RELIABLE: DeliveryPolicy = DeliveryPolicy::reliable(0);
const UNRELIABLE: DeliveryPolicy = DeliveryPolicy::unreliable(0);

fn unhandled<M: Message>(connection: ConnectionId, _message: &M) {
    debug!(%connection, message = M::name(), "no handler bound");
}

/// Handlers for everything a server receives.
///
/// One `on_<message>` method per incoming message. Unimplemented methods log
/// and drop the message.
#[allow(missing_docs)]
pub trait ServerCommands: Send + Sync + 'static {
    fn on_create_spaceship(&self, connection: ConnectionId, message: CreateSpaceship) {
        unhandled(connection, &message);
    }

    fn on_delete_spaceship(&self, connection: ConnectionId, message: DeleteSpaceship) {
        unhandled(connection, &message);
    }

    fn on_join_arena(&self, connection: ConnectionId, message: JoinArena) {
        unhandled(connection, &message);
    }

    fn on_leave_arena(&self, connection: ConnectionId, message: LeaveArena) {
        unhandled(connection, &message);
    }

    fn on_login(&self, connection: ConnectionId, message: Login) {
        unhandled(connection, &message);
    }

    fn on_login_by_token(&self, connection: ConnectionId, message: LoginByToken) {
        unhandled(connection, &message);
    }

    fn on_player_chat(&self, connection: ConnectionId, message: PlayerChat) {
        unhandled(connection, &message);
    }

    fn on_player_movement(&self, connection: ConnectionId, message: PlayerMovement) {
        unhandled(connection, &message);
    }

    fn on_player_shoot(&self, connection: ConnectionId, message: PlayerShoot) {
        unhandled(connection, &message);
    }

    fn on_query_arena_list(&self, connection: ConnectionId, message: QueryArenaList) {
        unhandled(connection, &message);
    }

    fn on_query_hull_list(&self, connection: ConnectionId, message: QueryHullList) {
        unhandled(connection, &message);
    }

    fn on_query_module_list(&self, connection: ConnectionId, message: QueryModuleList) {
        unhandled(connection, &message);
    }

    fn on_query_spaceship_info(&self, connection: ConnectionId, message: QuerySpaceshipInfo) {
        unhandled(connection, &message);
    }

    fn on_query_spaceship_list(&self, connection: ConnectionId, message: QuerySpaceshipList) {
        unhandled(connection, &message);
    }

    fn on_register(&self, connection: ConnectionId, message: Register) {
        unhandled(connection, &message);
    }

    fn on_time_sync_request(&self, connection: ConnectionId, message: TimeSyncRequest) {
        unhandled(connection, &message);
    }

    fn on_update_spaceship(&self, connection: ConnectionId, message: UpdateSpaceship) {
        unhandled(connection, &message);
    }
}

/// Handlers for everything a client receives.
///
/// One `on_<message>` method per incoming message. Unimplemented methods log
/// and drop the message.
#[allow(missing_docs)]
pub trait ClientCommands: Send + Sync + 'static {
    fn on_arena_list(&self, connection: ConnectionId, message: ArenaList) {
        unhandled(connection, &message);
    }

    fn on_arena_particle_systems(&self, connection: ConnectionId, message: ArenaParticleSystems) {
        unhandled(connection, &message);
    }

    fn on_arena_prefabs(&self, connection: ConnectionId, message: ArenaPrefabs) {
        unhandled(connection, &message);
    }

    fn on_arena_sounds(&self, connection: ConnectionId, message: ArenaSounds) {
        unhandled(connection, &message);
    }

    fn on_arena_state(&self, connection: ConnectionId, message: ArenaState) {
        unhandled(connection, &message);
    }

    fn on_bot_message(&self, connection: ConnectionId, message: BotMessage) {
        unhandled(connection, &message);
    }

    fn on_chat_message(&self, connection: ConnectionId, message: ChatMessage) {
        unhandled(connection, &message);
    }

    fn on_control_entity(&self, connection: ConnectionId, message: ControlEntity) {
        unhandled(connection, &message);
    }

    fn on_create_entity(&self, connection: ConnectionId, message: CreateEntity) {
        unhandled(connection, &message);
    }

    fn on_create_spaceship_failure(&self, connection: ConnectionId, message: CreateSpaceshipFailure) {
        unhandled(connection, &message);
    }

    fn on_create_spaceship_success(&self, connection: ConnectionId, message: CreateSpaceshipSuccess) {
        unhandled(connection, &message);
    }

    fn on_delete_entity(&self, connection: ConnectionId, message: DeleteEntity) {
        unhandled(connection, &message);
    }

    fn on_delete_spaceship_failure(&self, connection: ConnectionId, message: DeleteSpaceshipFailure) {
        unhandled(connection, &message);
    }

    fn on_delete_spaceship_success(&self, connection: ConnectionId, message: DeleteSpaceshipSuccess) {
        unhandled(connection, &message);
    }

    fn on_hull_list(&self, connection: ConnectionId, message: HullList) {
        unhandled(connection, &message);
    }

    fn on_instantiate_particle_system(&self, connection: ConnectionId, message: InstantiateParticleSystem) {
        unhandled(connection, &message);
    }

    fn on_integrity_update(&self, connection: ConnectionId, message: IntegrityUpdate) {
        unhandled(connection, &message);
    }

    fn on_login_failure(&self, connection: ConnectionId, message: LoginFailure) {
        unhandled(connection, &message);
    }

    fn on_login_success(&self, connection: ConnectionId, message: LoginSuccess) {
        unhandled(connection, &message);
    }

    fn on_module_list(&self, connection: ConnectionId, message: ModuleList) {
        unhandled(connection, &message);
    }

    fn on_network_strings(&self, connection: ConnectionId, message: NetworkStrings) {
        unhandled(connection, &message);
    }

    fn on_play_sound(&self, connection: ConnectionId, message: PlaySound) {
        unhandled(connection, &message);
    }

    fn on_register_failure(&self, connection: ConnectionId, message: RegisterFailure) {
        unhandled(connection, &message);
    }

    fn on_register_success(&self, connection: ConnectionId, message: RegisterSuccess) {
        unhandled(connection, &message);
    }

    fn on_spaceship_info(&self, connection: ConnectionId, message: SpaceshipInfo) {
        unhandled(connection, &message);
    }

    fn on_spaceship_list(&self, connection: ConnectionId, message: SpaceshipList) {
        unhandled(connection, &message);
    }

    fn on_time_sync_response(&self, connection: ConnectionId, message: TimeSyncResponse) {
        unhandled(connection, &message);
    }

    fn on_update_spaceship_failure(&self, connection: ConnectionId, message: UpdateSpaceshipFailure) {
        unhandled(connection, &message);
    }

    fn on_update_spaceship_success(&self, connection: ConnectionId, message: UpdateSpaceshipSuccess) {
        unhandled(connection, &message);
    }
}

fn incoming<M, H>(
    builder: &mut CommandRegistryBuilder,
    app: &Arc<H>,
    handler: fn(&H, ConnectionId, M),
) -> Result<()>
where
    M: Message,
    H: Send + Sync + 'static,
{
    let app = Arc::clone(app);
    builder.register_incoming::<M, _>(M::name(), move |connection, message| {
        handler(&app, connection, message);
    })?;
    Ok(())
}

fn outgoing<M: Message>(builder: &mut CommandRegistryBuilder, policy: DeliveryPolicy) -> Result<()> {
    builder.register_outgoing::<M>(M::name(), policy)?;
    Ok(())
}

/// Server-side registry with handlers bound to `app`
///
/// # Errors
///
/// Only fails if the table itself binds a message twice.
pub fn server_registry<H: ServerCommands>(app: Arc<H>, limits: CodecLimits) -> Result<CommandRegistry> {
    let mut builder = CommandRegistry::builder().limits(limits);

    incoming(&mut builder, &app, H::on_create_spaceship)?;
    incoming(&mut builder, &app, H::on_delete_spaceship)?;
    incoming(&mut builder, &app, H::on_join_arena)?;
    incoming(&mut builder, &app, H::on_leave_arena)?;
    incoming(&mut builder, &app, H::on_login)?;
    incoming(&mut builder, &app, H::on_login_by_token)?;
    incoming(&mut builder, &app, H::on_player_chat)?;
    incoming(&mut builder, &app, H::on_player_movement)?;
    incoming(&mut builder, &app, H::on_player_shoot)?;
    incoming(&mut builder, &app, H::on_query_arena_list)?;
    incoming(&mut builder, &app, H::on_query_hull_list)?;
    incoming(&mut builder, &app, H::on_query_module_list)?;
    incoming(&mut builder, &app, H::on_query_spaceship_info)?;
    incoming(&mut builder, &app, H::on_query_spaceship_list)?;
    incoming(&mut builder, &app, H::on_register)?;
    incoming(&mut builder, &app, H::on_time_sync_request)?;
    incoming(&mut builder, &app, H::on_update_spaceship)?;

    outgoing::<ArenaList>(&mut builder, RELIABLE)?;
    outgoing::<ArenaParticleSystems>(&mut builder, RELIABLE)?;
    outgoing::<ArenaPrefabs>(&mut builder, RELIABLE)?;
    outgoing::<ArenaSounds>(&mut builder, RELIABLE)?;
    outgoing::<ArenaState>(&mut builder, UNRELIABLE)?;
    outgoing::<BotMessage>(&mut builder, RELIABLE)?;
    outgoing::<ChatMessage>(&mut builder, RELIABLE)?;
    outgoing::<ControlEntity>(&mut builder, RELIABLE)?;
    outgoing::<CreateEntity>(&mut builder, RELIABLE)?;
    outgoing::<CreateSpaceshipFailure>(&mut builder, RELIABLE)?;
    outgoing::<CreateSpaceshipSuccess>(&mut builder, RELIABLE)?;
    outgoing::<DeleteEntity>(&mut builder, RELIABLE)?;
    outgoing::<DeleteSpaceshipFailure>(&mut builder, RELIABLE)?;
    outgoing::<DeleteSpaceshipSuccess>(&mut builder, RELIABLE)?;
    outgoing::<HullList>(&mut builder, RELIABLE)?;
    outgoing::<InstantiateParticleSystem>(&mut builder, RELIABLE)?;
    outgoing::<IntegrityUpdate>(&mut builder, RELIABLE)?;
    outgoing::<LoginFailure>(&mut builder, RELIABLE)?;
    outgoing::<LoginSuccess>(&mut builder, RELIABLE)?;
    outgoing::<ModuleList>(&mut builder, RELIABLE)?;
    outgoing::<NetworkStrings>(&mut builder, RELIABLE)?;
    outgoing::<PlaySound>(&mut builder, RELIABLE)?;
    outgoing::<RegisterFailure>(&mut builder, RELIABLE)?;
    outgoing::<RegisterSuccess>(&mut builder, RELIABLE)?;
    outgoing::<SpaceshipInfo>(&mut builder, RELIABLE)?;
    outgoing::<SpaceshipList>(&mut builder, RELIABLE)?;
    outgoing::<TimeSyncResponse>(&mut builder, UNRELIABLE)?;
    outgoing::<UpdateSpaceshipFailure>(&mut builder, RELIABLE)?;
    outgoing::<UpdateSpaceshipSuccess>(&mut builder, RELIABLE)?;

    Ok(builder.seal())
}

/// Client-side registry with handlers bound to `app`
///
/// # Errors
///
/// Only fails if the table itself binds a message twice.
pub fn client_registry<H: ClientCommands>(app: Arc<H>, limits: CodecLimits) -> Result<CommandRegistry> {
    let mut builder = CommandRegistry::builder().limits(limits);

    incoming(&mut builder, &app, H::on_arena_list)?;
    incoming(&mut builder, &app, H::on_arena_particle_systems)?;
    incoming(&mut builder, &app, H::on_arena_prefabs)?;
    incoming(&mut builder, &app, H::on_arena_sounds)?;
    incoming(&mut builder, &app, H::on_arena_state)?;
    incoming(&mut builder, &app, H::on_bot_message)?;
    incoming(&mut builder, &app, H::on_chat_message)?;
    incoming(&mut builder, &app, H::on_control_entity)?;
    incoming(&mut builder, &app, H::on_create_entity)?;
    incoming(&mut builder, &app, H::on_create_spaceship_failure)?;
    incoming(&mut builder, &app, H::on_create_spaceship_success)?;
    incoming(&mut builder, &app, H::on_delete_entity)?;
    incoming(&mut builder, &app, H::on_delete_spaceship_failure)?;
    incoming(&mut builder, &app, H::on_delete_spaceship_success)?;
    incoming(&mut builder, &app, H::on_hull_list)?;
    incoming(&mut builder, &app, H::on_instantiate_particle_system)?;
    incoming(&mut builder, &app, H::on_integrity_update)?;
    incoming(&mut builder, &app, H::on_login_failure)?;
    incoming(&mut builder, &app, H::on_login_success)?;
    incoming(&mut builder, &app, H::on_module_list)?;
    incoming(&mut builder, &app, H::on_network_strings)?;
    incoming(&mut builder, &app, H::on_play_sound)?;
    incoming(&mut builder, &app, H::on_register_failure)?;
    incoming(&mut builder, &app, H::on_register_success)?;
    incoming(&mut builder, &app, H::on_spaceship_info)?;
    incoming(&mut builder, &app, H::on_spaceship_list)?;
    incoming(&mut builder, &app, H::on_time_sync_response)?;
    incoming(&mut builder, &app, H::on_update_spaceship_failure)?;
    incoming(&mut builder, &app, H::on_update_spaceship_success)?;

    outgoing::<CreateSpaceship>(&mut builder, RELIABLE)?;
    outgoing::<DeleteSpaceship>(&mut builder, RELIABLE)?;
    outgoing::<JoinArena>(&mut builder, RELIABLE)?;
    outgoing::<LeaveArena>(&mut builder, RELIABLE)?;
    outgoing::<Login>(&mut builder, RELIABLE)?;
    outgoing::<LoginByToken>(&mut builder, RELIABLE)?;
    outgoing::<PlayerChat>(&mut builder, RELIABLE)?;
    outgoing::<PlayerMovement>(&mut builder, UNRELIABLE)?;
    outgoing::<PlayerShoot>(&mut builder, RELIABLE)?;
    outgoing::<QueryArenaList>(&mut builder, RELIABLE)?;
    outgoing::<QueryHullList>(&mut builder, RELIABLE)?;
    outgoing::<QueryModuleList>(&mut builder, RELIABLE)?;
    outgoing::<QuerySpaceshipInfo>(&mut builder, RELIABLE)?;
    outgoing::<QuerySpaceshipList>(&mut builder, RELIABLE)?;
    outgoing::<Register>(&mut builder, RELIABLE)?;
    outgoing::<TimeSyncRequest>(&mut builder, UNRELIABLE)?;
    outgoing::<UpdateSpaceship>(&mut builder, RELIABLE)?;

    Ok(builder.seal())
}
