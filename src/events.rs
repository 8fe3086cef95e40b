use crate::cards::card::Card;
use crate::game::{HandPhase, ShowdownResult};
use crate::{Chips, PlayerId, SeatIdx};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Wire names for the event kinds, for transports that key on a type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    BlindPosted,
    NewRound,
    ShowdownResult,
    GameStarted,
    NewHandStarted,
    PlayerReady,
    AllPlayersReady,
    GameEnded,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlindKind {
    Small,
    Big,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    BlindPosted {
        player_id: PlayerId,
        seat: SeatIdx,
        amount: Chips,
        blind: BlindKind,
    },
    NewRound {
        phase: HandPhase,
        community: Vec<Card>,
    },
    Showdown(ShowdownResult),
    GameStarted {
        players: Vec<PlayerId>,
    },
    NewHandStarted {
        round: u64,
        dealer: SeatIdx,
    },
    PlayerReady {
        player_id: PlayerId,
    },
    AllPlayersReady,
    GameEnded,
    Unknown,
}

/// One notification out of the core. The transport fans these out however
/// it likes; the core only promises per-table ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub table_id: String,
    pub payload: EventPayload,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::BlindPosted { .. } => EventKind::BlindPosted,
            EventPayload::NewRound { .. } => EventKind::NewRound,
            EventPayload::Showdown(_) => EventKind::ShowdownResult,
            EventPayload::GameStarted { .. } => EventKind::GameStarted,
            EventPayload::NewHandStarted { .. } => EventKind::NewHandStarted,
            EventPayload::PlayerReady { .. } => EventKind::PlayerReady,
            EventPayload::AllPlayersReady => EventKind::AllPlayersReady,
            EventPayload::GameEnded => EventKind::GameEnded,
            EventPayload::Unknown => EventKind::Unknown,
        }
    }
}

/// Best-effort, non-blocking publisher. With no channel attached it does
/// nothing; with a full channel the event is dropped and logged, never
/// awaited.
#[derive(Debug, Default)]
pub struct EventPublisher {
    tx: Mutex<Option<mpsc::Sender<Event>>>,
}

impl EventPublisher {
    pub fn set_channel(&self, tx: mpsc::Sender<Event>) {
        *self.tx.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
    }

    pub fn publish(&self, table_id: &str, payload: EventPayload) {
        let guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        let Some(tx) = guard.as_ref() else {
            return;
        };
        let event = Event {
            table_id: table_id.to_string(),
            payload,
        };
        if let Err(e) = tx.try_send(event) {
            log::warn!("event channel full or closed, dropping: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags() {
        let ev = Event {
            table_id: "t".into(),
            payload: EventPayload::AllPlayersReady,
        };
        assert_eq!(ev.kind(), EventKind::AllPlayersReady);
        assert_eq!(
            serde_json::to_string(&ev.kind()).unwrap(),
            "\"ALL_PLAYERS_READY\""
        );
    }

    #[tokio::test]
    async fn full_channel_drops() {
        let publisher = EventPublisher::default();
        let (tx, mut rx) = mpsc::channel(1);
        publisher.set_channel(tx);
        publisher.publish("t", EventPayload::GameEnded);
        publisher.publish("t", EventPayload::AllPlayersReady); // dropped
        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind(), EventKind::GameEnded);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn no_channel_is_a_no_op() {
        let publisher = EventPublisher::default();
        publisher.publish("t", EventPayload::GameEnded);
    }
}
