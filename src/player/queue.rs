use rand::seq::SliceRandom;
use serenity::model::id::UserId;
use std::collections::VecDeque;
use tracing::info;

use super::SessionError;

/// Petición de reproducción tal como la escribió el usuario.
///
/// La resolución a audio se pospone hasta que la entrada sale de la cola,
/// así cada entrada puede fallar (o no) de forma independiente.
#[derive(Debug, Clone)]
pub struct TrackRequest {
    pub query: String,
    pub requester_id: UserId,
    pub requester_name: String,
}

/// Registro del historial: una entrada por cada pista que EMPEZÓ a sonar.
///
/// `index` es un contador por guild, estrictamente creciente desde 1,
/// nunca reutilizado.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedEntry {
    pub index: u64,
    pub query: String,
    pub title: String,
    pub requester_id: UserId,
    pub thumbnail: Option<String>,
    pub play_count: u32,
}

/// Cola FIFO de peticiones pendientes, acotada por `limit`.
#[derive(Debug)]
pub struct TrackQueue {
    entries: VecDeque<TrackRequest>,
    limit: usize,
}

impl TrackQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Agrega una petición al final; devuelve su posición (1-based).
    pub fn push(&mut self, request: TrackRequest) -> Result<usize, SessionError> {
        if self.entries.len() >= self.limit {
            return Err(SessionError::QueueFull(self.limit));
        }
        self.entries.push_back(request);
        Ok(self.entries.len())
    }

    pub fn pop_front(&mut self) -> Option<TrackRequest> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            info!("🗑️ Cola limpiada ({} entradas)", self.entries.len());
        }
        self.entries.clear();
    }

    /// Permutación aleatoria in-place de las entradas pendientes.
    pub fn shuffle(&mut self) {
        let mut items: Vec<_> = self.entries.drain(..).collect();
        items.shuffle(&mut rand::thread_rng());
        self.entries.extend(items);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<TrackRequest> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn req(query: &str) -> TrackRequest {
        TrackRequest {
            query: query.to_string(),
            requester_id: UserId::new(7),
            requester_name: "tester".to_string(),
        }
    }

    #[test]
    fn fifo_order() {
        let mut q = TrackQueue::new(10);
        assert_eq!(q.push(req("a")).unwrap(), 1);
        assert_eq!(q.push(req("b")).unwrap(), 2);
        assert_eq!(q.push(req("c")).unwrap(), 3);

        assert_eq!(q.pop_front().unwrap().query, "a");
        assert_eq!(q.pop_front().unwrap().query, "b");
        assert_eq!(q.pop_front().unwrap().query, "c");
        assert!(q.pop_front().is_none());
    }

    #[test]
    fn rejects_when_full() {
        let mut q = TrackQueue::new(2);
        q.push(req("a")).unwrap();
        q.push(req("b")).unwrap();
        assert_eq!(q.push(req("c")), Err(SessionError::QueueFull(2)));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn shuffle_preserves_set_and_count() {
        let mut q = TrackQueue::new(50);
        for i in 0..20 {
            q.push(req(&format!("song-{i}"))).unwrap();
        }
        let mut before: Vec<String> = q.snapshot().into_iter().map(|r| r.query).collect();

        q.shuffle();

        let mut after: Vec<String> = q.snapshot().into_iter().map(|r| r.query).collect();
        assert_eq!(after.len(), 20);
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn clear_empties_queue() {
        let mut q = TrackQueue::new(10);
        q.push(req("a")).unwrap();
        q.push(req("b")).unwrap();
        q.clear();
        assert!(q.is_empty());
    }
}
