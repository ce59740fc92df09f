use parking_lot::Mutex;
use serenity::model::id::{GuildId, UserId};
use songbird::{
    tracks::TrackHandle, Call, Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use super::{
    queue::{PlayedEntry, TrackQueue, TrackRequest},
    SessionError,
};
use crate::resolver::{ResolvedTrack, TrackResolver};

/// Pausa corta tras un stop() explícito antes de emitir un play() nuevo,
/// para que el sink asiente.
const STOP_SETTLE: Duration = Duration::from_millis(300);

/// Gracia tras quedar inactiva antes de soltar la conexión de voz.
const IDLE_DISCONNECT_AFTER: Duration = Duration::from_secs(60);

/// Estados del reproductor por guild. `Advancing` no es un estado
/// almacenado: es el cuerpo transitorio del callback de fin de pista.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Connecting,
    Playing,
    Paused,
}

/// Resultado de un enqueue: si no había nada activo, el llamador debe
/// iniciar el avance con [`PlaybackSession::play_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued(usize),
    StartPlayback(usize),
}

/// Resultado de un paso del avance, antes de tocar el sink.
enum AdvanceStep {
    /// Ya hay una pista activa; este avance llegó tarde y no debe sacar
    /// nada de la cola.
    Busy,
    /// La cola se agotó; la sesión quedó en `Idle`.
    QueueExhausted,
    /// Petición resuelta, lista para arrancar en el sink.
    Start(TrackRequest, ResolvedTrack, u64),
    /// La entrada no se pudo resolver y fue descartada.
    Skipped,
}

/// Estado mutable de la sesión. Todas las secciones críticas sobre él son
/// cortas y sin awaits; lo que puede bloquear (resolver, conectar) ocurre
/// fuera del lock y su resultado se aplica en un paso atómico.
struct SessionState {
    state: PlaybackState,
    queue: TrackQueue,
    history: Vec<PlayedEntry>,
    current: Option<PlayedEntry>,
    /// Próximo índice de historial; arranca en 1 y nunca se reutiliza.
    next_index: u64,
    /// Se incrementa en cada stop/skip/replay; los resultados asíncronos
    /// cuya generación capturada no coincide se descartan en silencio.
    generation: u64,
    /// Token de la reproducción activa. Un callback de fin solo avanza si
    /// logra reclamar su token, así dos disparos casi simultáneos nunca
    /// producen dos avances.
    active_token: Option<u64>,
    /// Época del vigilante de inactividad. Se incrementa al programar un
    /// vigilante nuevo y al arrancar cualquier pista; un vigilante cuya
    /// época ya no coincide no desconecta.
    idle_epoch: u64,
    volume: f32,
}

impl SessionState {
    fn new(queue_limit: usize, volume: f32) -> Self {
        Self {
            state: PlaybackState::Idle,
            queue: TrackQueue::new(queue_limit),
            history: Vec::new(),
            current: None,
            next_index: 1,
            generation: 0,
            active_token: None,
            idle_epoch: 0,
            volume,
        }
    }

    /// Registra el arranque de una pista: entrada de historial nueva,
    /// pista actual sobreescrita y token activo en un solo paso.
    fn record_started(
        &mut self,
        query: &str,
        requester_id: UserId,
        title: String,
        thumbnail: Option<String>,
    ) -> PlayedEntry {
        let index = self.next_index;
        self.next_index += 1;

        let play_count = self
            .history
            .iter()
            .filter(|e| e.query == query)
            .count() as u32
            + 1;

        let entry = PlayedEntry {
            index,
            query: query.to_string(),
            title,
            requester_id,
            thumbnail,
            play_count,
        };

        self.history.push(entry.clone());
        self.current = Some(entry.clone());
        self.active_token = Some(index);
        self.state = PlaybackState::Playing;
        // Cualquier pista nueva invalida un vigilante de inactividad
        // pendiente.
        self.idle_epoch += 1;
        entry
    }

    /// Reclama el token de fin de pista; solo el primer disparo gana.
    fn claim_token(&mut self, token: u64) -> bool {
        if self.active_token == Some(token) {
            self.active_token = None;
            true
        } else {
            false
        }
    }

    fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn adjust_volume(&mut self, delta: f32) -> f32 {
        self.volume = (self.volume + delta).clamp(0.1, 2.0);
        self.volume
    }

    /// Pista a repetir: la actual, o la del historial con ese número.
    fn replay_target(&self, number: Option<u64>) -> Result<PlayedEntry, SessionError> {
        match number {
            None => self.current.clone().ok_or(SessionError::NotFound),
            Some(n) => self
                .history
                .iter()
                .find(|e| e.index == n)
                .cloned()
                .ok_or(SessionError::NotFound),
        }
    }
}

/// Sesión de reproducción de una guild.
///
/// `inner` serializa las mutaciones de estado (un ámbito de exclusión por
/// guild, nunca compartido entre guilds); `advance` serializa la secuencia
/// asíncrona resolver→reproducir para que dos avances concurrentes nunca
/// saquen dos pistas por un solo "advance".
pub struct PlaybackSession {
    guild_id: GuildId,
    inner: Mutex<SessionState>,
    advance: AsyncMutex<()>,
    handle: Mutex<Option<TrackHandle>>,
    resolver: Arc<dyn TrackResolver>,
}

impl PlaybackSession {
    pub fn new(
        guild_id: GuildId,
        resolver: Arc<dyn TrackResolver>,
        queue_limit: usize,
        default_volume: f32,
    ) -> Self {
        Self {
            guild_id,
            inner: Mutex::new(SessionState::new(queue_limit, default_volume)),
            advance: AsyncMutex::new(()),
            handle: Mutex::new(None),
            resolver,
        }
    }

    /// Agrega una petición a la cola. Si no había nada activo la sesión
    /// pasa a `Connecting` y el llamador debe iniciar `play_next`.
    pub fn enqueue(&self, request: TrackRequest) -> Result<EnqueueOutcome, SessionError> {
        let mut st = self.inner.lock();
        let position = st.queue.push(request)?;

        if st.state == PlaybackState::Idle && st.active_token.is_none() {
            // Reservar el arranque aquí evita que dos enqueues casi
            // simultáneos disparen dos play_next.
            st.state = PlaybackState::Connecting;
            Ok(EnqueueOutcome::StartPlayback(position))
        } else {
            Ok(EnqueueOutcome::Queued(position))
        }
    }

    /// Avanza al siguiente elemento de la cola y lo reproduce en el sink.
    ///
    /// Único punto de entrada del "Advancing": lo llaman el arranque tras
    /// un enqueue en vacío y el callback de fin de pista. Una entrada que
    /// falla al resolverse se salta (con log) y se intenta la siguiente,
    /// acotado por la longitud de la cola observada al entrar; agotada la
    /// cola, la sesión queda en `Idle` con la conexión intacta y un
    /// vigilante de inactividad armado.
    pub async fn play_next(self: &Arc<Self>, call: Arc<AsyncMutex<Call>>) {
        let _advancing = self.advance.lock().await;

        let mut budget = {
            let st = self.inner.lock();
            st.queue.len().max(1)
        };

        loop {
            match self.advance_resolve().await {
                AdvanceStep::Busy => return,
                AdvanceStep::QueueExhausted => {
                    debug!("📭 Cola vacía en guild {}, sesión inactiva", self.guild_id);
                    self.schedule_idle_disconnect(call);
                    return;
                }
                AdvanceStep::Start(request, resolved, generation) => {
                    // `false` significa resultado obsoleto
                    // (stop/skip/replay intermedio); en ambos casos este
                    // avance terminó.
                    let _ = self.start_resolved(&call, &request, resolved, generation).await;
                    return;
                }
                AdvanceStep::Skipped => {
                    budget -= 1;
                    if budget == 0 {
                        let mut st = self.inner.lock();
                        if st.state == PlaybackState::Connecting {
                            st.state = PlaybackState::Idle;
                        }
                        drop(st);
                        self.schedule_idle_disconnect(call);
                        return;
                    }
                }
            }
        }
    }

    /// Un paso del avance: decide si corresponde sacar de la cola y, si
    /// sí, resuelve la petición. No toca el sink.
    ///
    /// El chequeo del token activo cierra una carrera: un avance que
    /// llega mientras otra reproducción ya arrancó no debe sacar una
    /// segunda entrada (a lo sumo una pista en vuelo por guild).
    async fn advance_resolve(&self) -> AdvanceStep {
        let (request, generation) = {
            let mut st = self.inner.lock();
            if st.active_token.is_some() {
                debug!(
                    "▶️ Avance tardío ignorado en guild {}: ya hay una pista activa",
                    self.guild_id
                );
                return AdvanceStep::Busy;
            }
            match st.queue.pop_front() {
                Some(r) => {
                    st.state = PlaybackState::Connecting;
                    (r, st.generation)
                }
                None => {
                    st.state = PlaybackState::Idle;
                    return AdvanceStep::QueueExhausted;
                }
            }
        };

        match self.resolver.resolve(&request.query).await {
            Ok(resolved) => AdvanceStep::Start(request, resolved, generation),
            Err(e) => {
                warn!(
                    "⚠️ No se pudo resolver '{}' en guild {}: {} (saltando entrada)",
                    request.query, self.guild_id, e
                );
                AdvanceStep::Skipped
            }
        }
    }

    /// Arma el vigilante de inactividad: pasada la gracia, si la sesión
    /// sigue sin reproducir nada y sin cola, suelta la conexión de voz.
    /// Cualquier pista que arranque antes invalida la época capturada.
    fn schedule_idle_disconnect(self: &Arc<Self>, call: Arc<AsyncMutex<Call>>) {
        let epoch = {
            let mut st = self.inner.lock();
            st.idle_epoch += 1;
            st.idle_epoch
        };
        let session = self.clone();

        tokio::spawn(async move {
            tokio::time::sleep(IDLE_DISCONNECT_AFTER).await;
            if !session.still_idle(epoch) {
                return;
            }
            let mut sink = call.lock().await;
            match sink.leave().await {
                Ok(()) => info!(
                    "🚪 Desconectado por inactividad en guild {}",
                    session.guild_id
                ),
                Err(e) => warn!(
                    "⚠️ No se pudo soltar la conexión inactiva en guild {}: {}",
                    session.guild_id, e
                ),
            }
        });
    }

    /// ¿El vigilante con esta época sigue siendo el vigente y la sesión
    /// sigue inactiva?
    fn still_idle(&self, epoch: u64) -> bool {
        let st = self.inner.lock();
        st.idle_epoch == epoch
            && st.state == PlaybackState::Idle
            && st.active_token.is_none()
            && st.queue.is_empty()
    }

    /// Aplica una resolución al estado y arranca el sink. Devuelve `false`
    /// si el resultado quedó obsoleto y fue descartado.
    async fn start_resolved(
        self: &Arc<Self>,
        call: &Arc<AsyncMutex<Call>>,
        request: &TrackRequest,
        resolved: ResolvedTrack,
        generation: u64,
    ) -> bool {
        let (entry, volume) = {
            let mut st = self.inner.lock();
            if st.generation != generation {
                if st.state == PlaybackState::Connecting {
                    st.state = PlaybackState::Idle;
                }
                debug!(
                    "🗑️ Resolución obsoleta descartada en guild {} ('{}')",
                    self.guild_id, request.query
                );
                return false;
            }
            let entry = st.record_started(
                &request.query,
                request.requester_id,
                resolved.title,
                resolved.thumbnail,
            );
            (entry, st.volume)
        };

        let track = {
            let mut sink = call.lock().await;
            sink.play_input(resolved.input)
        };
        let _ = track.set_volume(volume);
        let _ = track.add_event(
            Event::Track(TrackEvent::End),
            TrackEndHandler {
                session: self.clone(),
                call: call.clone(),
                token: entry.index,
            },
        );
        let _ = track.add_event(
            Event::Track(TrackEvent::Error),
            TrackErrorHandler {
                session: self.clone(),
                call: call.clone(),
                token: entry.index,
            },
        );
        *self.handle.lock() = Some(track);

        info!(
            "🎵 [#{}] Reproduciendo en guild {}: {} (pedida por {})",
            entry.index, self.guild_id, entry.title, request.requester_name
        );
        true
    }

    /// Callback de fin de pista: exactamente un avance por reproducción,
    /// tanto si terminó sola, fue detenida o falló a mitad de stream.
    async fn on_track_end(self: &Arc<Self>, call: Arc<AsyncMutex<Call>>, token: u64) {
        let advance = {
            let mut st = self.inner.lock();
            st.claim_token(token)
        };
        if !advance {
            debug!(
                "🔁 Fin de pista duplicado u obsoleto ignorado (token {}) en guild {}",
                token, self.guild_id
            );
            return;
        }
        *self.handle.lock() = None;
        self.play_next(call).await;
    }

    /// Pide detener la pista activa; el avance llega por el callback.
    ///
    /// La generación solo se invalida cuando de verdad hay algo que
    /// detener: un skip que devuelve `NothingPlaying` no deja rastro.
    pub fn skip(&self) -> Result<(), SessionError> {
        let handle = self
            .handle
            .lock()
            .clone()
            .ok_or(SessionError::NothingPlaying)?;
        {
            let mut st = self.inner.lock();
            if st.active_token.is_none() {
                return Err(SessionError::NothingPlaying);
            }
            st.bump_generation();
        }
        let _ = handle.stop();
        Ok(())
    }

    pub fn pause(&self) -> Result<(), SessionError> {
        {
            let mut st = self.inner.lock();
            if st.state != PlaybackState::Playing {
                return Err(SessionError::InvalidState);
            }
            st.state = PlaybackState::Paused;
        }
        if let Some(h) = self.handle.lock().as_ref() {
            let _ = h.pause();
        }
        Ok(())
    }

    pub fn resume(&self) -> Result<(), SessionError> {
        {
            let mut st = self.inner.lock();
            if st.state != PlaybackState::Paused {
                return Err(SessionError::InvalidState);
            }
            st.state = PlaybackState::Playing;
        }
        if let Some(h) = self.handle.lock().as_ref() {
            let _ = h.play();
        }
        Ok(())
    }

    /// Limpia la cola y detiene el sink. La conexión de voz queda abierta
    /// y la pista actual se conserva en el historial.
    pub fn stop(&self) {
        {
            let mut st = self.inner.lock();
            st.queue.clear();
            st.state = PlaybackState::Idle;
            st.active_token = None;
            st.bump_generation();
        }
        if let Some(h) = self.handle.lock().take() {
            let _ = h.stop();
        }
        info!("⏹️ Reproducción detenida en guild {}", self.guild_id);
    }

    /// Repite la pista actual o una del historial por número.
    ///
    /// Canal lateral: detiene la reproducción activa sin consumir entrada
    /// de cola (el token activo se limpia antes del stop, así el fin de la
    /// pista detenida no dispara un avance) y re-resuelve la consulta
    /// original, registrando una entrada de historial nueva.
    pub async fn replay(
        self: &Arc<Self>,
        number: Option<u64>,
        call: Arc<AsyncMutex<Call>>,
    ) -> Result<PlayedEntry, SessionError> {
        let (target, generation) = {
            let mut st = self.inner.lock();
            let target = st.replay_target(number)?;
            st.active_token = None;
            st.state = PlaybackState::Connecting;
            let generation = st.bump_generation();
            (target, generation)
        };

        if let Some(h) = self.handle.lock().take() {
            let _ = h.stop();
        }
        tokio::time::sleep(STOP_SETTLE).await;

        let resolved = match self.resolver.resolve(&target.query).await {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    "⚠️ Replay falló al resolver '{}' en guild {}: {}",
                    target.query, self.guild_id, e
                );
                let mut st = self.inner.lock();
                if st.generation == generation && st.state == PlaybackState::Connecting {
                    st.state = PlaybackState::Idle;
                }
                return Err(SessionError::ResolutionFailed);
            }
        };

        let request = TrackRequest {
            query: target.query.clone(),
            requester_id: target.requester_id,
            requester_name: String::new(),
        };
        if self.start_resolved(&call, &request, resolved, generation).await {
            let entry = self
                .now_playing()
                .ok_or(SessionError::Superseded)?;
            info!(
                "🔁 Replay [#{}] de '{}' en guild {}",
                entry.index, entry.title, self.guild_id
            );
            Ok(entry)
        } else {
            Err(SessionError::Superseded)
        }
    }

    /// Ajusta el volumen en `delta`, acotado a [0.1, 2.0]; lo aplica al
    /// sink directamente (campo compartido benigno, fuera del lock).
    pub fn adjust_volume(&self, delta: f32) -> f32 {
        let volume = self.inner.lock().adjust_volume(delta);
        if let Some(h) = self.handle.lock().as_ref() {
            let _ = h.set_volume(volume);
        }
        volume
    }

    /// Permuta la cola pendiente; el historial no se toca.
    pub fn shuffle(&self) -> Result<usize, SessionError> {
        let mut st = self.inner.lock();
        if st.queue.is_empty() {
            return Err(SessionError::EmptyQueue);
        }
        st.queue.shuffle();
        Ok(st.queue.len())
    }

    /// Interrumpe la música para dar paso al TTS: detiene el sink sin
    /// consumir cola ni disparar avance. La cola queda intacta.
    pub fn interrupt(&self) -> bool {
        let was_active = {
            let mut st = self.inner.lock();
            let was_active = st.active_token.take().is_some();
            if was_active {
                st.state = PlaybackState::Idle;
                st.bump_generation();
            }
            was_active
        };
        if let Some(h) = self.handle.lock().take() {
            let _ = h.stop();
        }
        was_active
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.lock().state
    }

    pub fn now_playing(&self) -> Option<PlayedEntry> {
        self.inner.lock().current.clone()
    }

    pub fn queue_snapshot(&self) -> Vec<TrackRequest> {
        self.inner.lock().queue.snapshot()
    }

    pub fn queue_len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn volume(&self) -> f32 {
        self.inner.lock().volume
    }
}

/// Fin natural o stop explícito de la pista: dispara el avance.
struct TrackEndHandler {
    session: Arc<PlaybackSession>,
    call: Arc<AsyncMutex<Call>>,
    token: u64,
}

#[async_trait::async_trait]
impl VoiceEventHandler for TrackEndHandler {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        self.session
            .on_track_end(self.call.clone(), self.token)
            .await;
        None
    }
}

/// Error del sink a mitad de stream: se trata igual que un fin natural
/// a efectos de avance, dejando constancia en el log.
struct TrackErrorHandler {
    session: Arc<PlaybackSession>,
    call: Arc<AsyncMutex<Call>>,
    token: u64,
}

#[async_trait::async_trait]
impl VoiceEventHandler for TrackErrorHandler {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        warn!("💥 Error de reproducción (token {}), avanzando", self.token);
        self.session
            .on_track_end(self.call.clone(), self.token)
            .await;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolveError;
    use pretty_assertions::assert_eq;

    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingResolver;

    #[async_trait::async_trait]
    impl TrackResolver for FailingResolver {
        async fn resolve(&self, _query: &str) -> Result<ResolvedTrack, ResolveError> {
            Err(ResolveError::MissingStream)
        }
    }

    /// Cuenta cada invocación al resolutor; la resolución en sí falla
    /// para que el avance no necesite un sink real.
    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TrackResolver for CountingResolver {
        async fn resolve(&self, _query: &str) -> Result<ResolvedTrack, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ResolveError::MissingStream)
        }
    }

    fn session_with(resolver: Arc<dyn TrackResolver>) -> Arc<PlaybackSession> {
        Arc::new(PlaybackSession::new(GuildId::new(1), resolver, 100, 1.15))
    }

    fn session() -> Arc<PlaybackSession> {
        session_with(Arc::new(FailingResolver))
    }

    fn req(query: &str) -> TrackRequest {
        TrackRequest {
            query: query.to_string(),
            requester_id: UserId::new(42),
            requester_name: "tester".to_string(),
        }
    }

    #[test]
    fn enqueue_idle_reserves_start() {
        let s = session();
        assert_eq!(
            s.enqueue(req("a")).unwrap(),
            EnqueueOutcome::StartPlayback(1)
        );
        assert_eq!(s.state(), PlaybackState::Connecting);
        // Una segunda petición mientras el arranque está en vuelo solo
        // se encola, sin segundo arranque.
        assert_eq!(s.enqueue(req("b")).unwrap(), EnqueueOutcome::Queued(2));
    }

    #[test]
    fn enqueue_while_playing_only_appends() {
        let s = session();
        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "Canción A".into(), None);
        }
        assert_eq!(s.enqueue(req("b")).unwrap(), EnqueueOutcome::Queued(1));
        assert_eq!(s.enqueue(req("c")).unwrap(), EnqueueOutcome::Queued(2));
        assert_eq!(s.state(), PlaybackState::Playing);
    }

    #[test]
    fn history_indices_are_gapless_and_monotonic() {
        let s = session();
        let mut st = s.inner.lock();
        for i in 0..50u64 {
            let e = st.record_started(
                &format!("q{i}"),
                UserId::new(42),
                format!("T{i}"),
                None,
            );
            assert_eq!(e.index, i + 1);
        }
        assert_eq!(st.history.len(), 50);
        for (pos, e) in st.history.iter().enumerate() {
            assert_eq!(e.index, pos as u64 + 1);
        }
        assert_eq!(st.current.as_ref().unwrap().index, 50);
    }

    #[test]
    fn play_count_increments_per_repeated_query() {
        let s = session();
        let mut st = s.inner.lock();
        assert_eq!(st.record_started("q", UserId::new(1), "T".into(), None).play_count, 1);
        assert_eq!(st.record_started("otra", UserId::new(1), "O".into(), None).play_count, 1);
        assert_eq!(st.record_started("q", UserId::new(1), "T".into(), None).play_count, 2);
    }

    #[tokio::test]
    async fn duplicate_completion_triggers_claim_once() {
        let s = session();
        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "A".into(), None);
        }

        // Un skip y un fin natural llegando en el mismo tick: solo uno
        // debe ganar el reclamo del token.
        let s1 = s.clone();
        let s2 = s.clone();
        let t1 = tokio::spawn(async move { s1.inner.lock().claim_token(1) });
        let t2 = tokio::spawn(async move { s2.inner.lock().claim_token(1) });
        let wins = [t1.await.unwrap(), t2.await.unwrap()]
            .iter()
            .filter(|w| **w)
            .count();
        assert_eq!(wins, 1);
    }

    #[test]
    fn stop_clears_queue_but_keeps_current() {
        let s = session();
        {
            let mut st = s.inner.lock();
            st.record_started("b", UserId::new(42), "Canción B".into(), None);
        }
        s.enqueue(req("c")).unwrap();
        let generation_before = s.inner.lock().generation;

        s.stop();

        let st = s.inner.lock();
        assert!(st.queue.is_empty());
        assert_eq!(st.state, PlaybackState::Idle);
        assert_eq!(st.active_token, None);
        assert!(st.generation > generation_before);
        assert_eq!(st.current.as_ref().unwrap().title, "Canción B");
    }

    #[test]
    fn replay_target_out_of_range_is_not_found() {
        let s = session();
        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "A".into(), None);
        }
        let st = s.inner.lock();
        assert_eq!(st.replay_target(Some(99)), Err(SessionError::NotFound));
        // El estado no cambió.
        assert_eq!(st.current.as_ref().unwrap().index, 1);
        assert_eq!(st.history.len(), 1);
    }

    #[test]
    fn replay_without_number_targets_current() {
        let s = session();
        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "A".into(), None);
            st.record_started("b", UserId::new(42), "B".into(), None);
        }
        let st = s.inner.lock();
        assert_eq!(st.replay_target(None).unwrap().query, "b");
        assert_eq!(st.replay_target(Some(1)).unwrap().query, "a");
    }

    #[test]
    fn volume_never_leaves_range() {
        let s = session();
        for _ in 0..40 {
            let v = s.adjust_volume(0.1);
            assert!((0.1..=2.0).contains(&v));
        }
        assert!((s.volume() - 2.0).abs() < f32::EPSILON);
        for _ in 0..40 {
            let v = s.adjust_volume(-0.1);
            assert!((0.1..=2.0).contains(&v));
        }
        assert!((s.volume() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn shuffle_empty_queue_is_error() {
        let s = session();
        assert_eq!(s.shuffle(), Err(SessionError::EmptyQueue));
    }

    #[test]
    fn skip_without_active_track_is_nothing_playing() {
        let s = session();
        assert_eq!(s.skip(), Err(SessionError::NothingPlaying));
    }

    #[test]
    fn failed_skip_leaves_generation_untouched() {
        let s = session();
        let before = s.inner.lock().generation;
        assert_eq!(s.skip(), Err(SessionError::NothingPlaying));
        assert_eq!(s.inner.lock().generation, before);
    }

    #[test]
    fn skip_before_sink_handle_exists_is_clean() {
        let s = session();
        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "A".into(), None);
        }
        // El token activo ya existe pero el sink todavía no entregó su
        // handle: el skip falla sin invalidar la generación, así la
        // resolución en vuelo no se descarta por error.
        let before = s.inner.lock().generation;
        assert_eq!(s.skip(), Err(SessionError::NothingPlaying));
        assert_eq!(s.inner.lock().generation, before);
    }

    #[tokio::test]
    async fn late_advance_never_dequeues_while_a_track_is_active() {
        let s = session();
        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "A".into(), None);
        }
        s.enqueue(req("b")).unwrap();

        // Un avance que llega con una pista ya en vuelo se retira sin
        // tocar la cola ni el estado: a lo sumo una pista por guild.
        assert!(matches!(s.advance_resolve().await, AdvanceStep::Busy));
        assert_eq!(s.queue_len(), 1);
        assert_eq!(s.state(), PlaybackState::Playing);
    }

    #[tokio::test]
    async fn idle_enqueue_resolves_exactly_once() {
        let resolver = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let s = session_with(resolver.clone());

        assert_eq!(
            s.enqueue(req("a")).unwrap(),
            EnqueueOutcome::StartPlayback(1)
        );
        // Encolar no resuelve; eso le toca al avance.
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);

        assert!(matches!(s.advance_resolve().await, AdvanceStep::Skipped));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);

        // Con la cola vacía el avance no vuelve a tocar el resolutor.
        assert!(matches!(
            s.advance_resolve().await,
            AdvanceStep::QueueExhausted
        ));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn enqueue_while_playing_never_touches_the_resolver() {
        let resolver = Arc::new(CountingResolver {
            calls: AtomicUsize::new(0),
        });
        let s = session_with(resolver.clone());
        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "A".into(), None);
        }

        s.enqueue(req("b")).unwrap();
        s.enqueue(req("c")).unwrap();
        assert!(matches!(s.advance_resolve().await, AdvanceStep::Busy));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn idle_watchdog_epoch_is_invalidated_by_new_playback() {
        let s = session();
        let epoch = {
            let mut st = s.inner.lock();
            st.idle_epoch += 1;
            st.idle_epoch
        };
        assert!(s.still_idle(epoch));

        {
            let mut st = s.inner.lock();
            st.record_started("a", UserId::new(42), "A".into(), None);
        }
        assert!(!s.still_idle(epoch));
    }

    #[test]
    fn idle_watchdog_epoch_is_superseded_by_a_newer_one() {
        let s = session();
        let old = {
            let mut st = s.inner.lock();
            st.idle_epoch += 1;
            st.idle_epoch
        };
        let newer = {
            let mut st = s.inner.lock();
            st.idle_epoch += 1;
            st.idle_epoch
        };
        assert!(!s.still_idle(old));
        assert!(s.still_idle(newer));
    }

    #[test]
    fn idle_watchdog_waits_while_queue_has_entries() {
        let s = session();
        let epoch = {
            let mut st = s.inner.lock();
            st.idle_epoch += 1;
            st.idle_epoch
        };
        s.enqueue(req("a")).unwrap();
        assert!(!s.still_idle(epoch));
    }

    #[test]
    fn pause_resume_invalid_states() {
        let s = session();
        assert_eq!(s.pause(), Err(SessionError::InvalidState));
        assert_eq!(s.resume(), Err(SessionError::InvalidState));
    }

    /// Escenario completo de la cola `["a","b","c"]` del diseño:
    /// play → skip → stop → replay, verificando índices y pista actual.
    #[test]
    fn skip_stop_replay_scenario() {
        let s = session();

        // enqueue("a") con sesión inactiva: arranca y suena "a" (índice 1).
        assert_eq!(s.enqueue(req("a")).unwrap(), EnqueueOutcome::StartPlayback(1));
        {
            let mut st = s.inner.lock();
            let r = st.queue.pop_front().unwrap();
            let e = st.record_started(&r.query, r.requester_id, "Canción A".into(), None);
            assert_eq!(e.index, 1);
        }
        s.enqueue(req("b")).unwrap();
        s.enqueue(req("c")).unwrap();

        // skip mientras suena "a": invalida la generación, el sink se
        // detiene y su callback reclama el token; el avance saca "b"
        // (índice 2).
        {
            let mut st = s.inner.lock();
            st.bump_generation();
            assert!(st.claim_token(1));
            let r = st.queue.pop_front().unwrap();
            assert_eq!(r.query, "b");
            let e = st.record_started(&r.query, r.requester_id, "Canción B".into(), None);
            assert_eq!(e.index, 2);
            assert_eq!(st.queue.len(), 1); // queda ["c"]
        }

        // stop: cola vacía, sesión Idle, la actual sigue siendo "b".
        s.stop();
        {
            let st = s.inner.lock();
            assert!(st.queue.is_empty());
            assert_eq!(st.state, PlaybackState::Idle);
            assert_eq!(st.current.as_ref().unwrap().query, "b");
        }

        // replay sin argumento: re-usa la consulta de "b", índice 3.
        {
            let mut st = s.inner.lock();
            let target = st.replay_target(None).unwrap();
            assert_eq!(target.query, "b");
            let e = st.record_started(&target.query, target.requester_id, "Canción B".into(), None);
            assert_eq!(e.index, 3);
            assert_eq!(e.play_count, 2);
        }
    }
}
