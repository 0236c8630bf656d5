//! "Now playing" presence shared with the chat server.
//!
//! The store publishes an [`Activity`] whenever what the user hears changes.
//! A [`PresenceChannel`] turns it into an [`ActivityUpdate`] for the signed-in
//! user and hands it to the socket forwarder thread.

pub mod socket;

use std::fmt::Display;

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use crate::song::Song;

/// What the user is doing right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Playing { title: String, artist: String },
    Idle,
}

impl Activity {
    pub fn playing(song: &Song) -> Self {
        Activity::Playing {
            title: song.title.clone(),
            artist: song.artist.clone(),
        }
    }
}

impl Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activity::Playing { title, artist } => write!(f, "Playing {} by {}", title, artist),
            Activity::Idle => write!(f, "Idle"),
        }
    }
}

/// Payload of the `update_activity` socket event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    pub user_id: String,
    pub activity: String,
}

/// Anything that can carry presence out of the store
pub trait PresenceSink: Send {
    fn publish(&self, activity: Activity);
}

/// Discards every activity
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPresence;

impl PresenceSink for NoPresence {
    fn publish(&self, _activity: Activity) {}
}

/// Auth state of the realtime connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Sends activity updates to the socket forwarder, but only for a signed-in user
#[derive(Debug, Clone)]
pub struct PresenceChannel {
    session: Session,
    tx: Sender<ActivityUpdate>,
}

impl PresenceChannel {
    pub fn new(session: Session, tx: Sender<ActivityUpdate>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl PresenceSink for PresenceChannel {
    fn publish(&self, activity: Activity) {
        let Some(user_id) = self.session.user_id() else {
            log::debug!("Not signed in, dropping activity: {}", activity);
            return;
        };

        let update = ActivityUpdate {
            user_id: user_id.to_string(),
            activity: activity.to_string(),
        };

        log::debug!("Publishing activity: {}", update.activity);
        if self.tx.send(update).is_err() {
            log::warn!("Presence forwarder is gone, activity not delivered");
        }
    }
}

impl<T: PresenceSink + Sync> PresenceSink for std::sync::Arc<T> {
    fn publish(&self, activity: Activity) {
        (**self).publish(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_text_matches_the_web_client() {
        let song = Song::new("1", "Levitating", "Dua Lipa", "l.mp3");
        assert_eq!(Activity::playing(&song).to_string(), "Playing Levitating by Dua Lipa");
        assert_eq!(Activity::Idle.to_string(), "Idle");
    }

    #[test]
    fn update_serializes_camel_case() {
        let update = ActivityUpdate {
            user_id: "user_42".into(),
            activity: "Idle".into(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "userId": "user_42", "activity": "Idle" }));
    }

    #[test]
    fn authenticated_session_forwards_updates() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let channel = PresenceChannel::new(Session::authenticated("user_42"), tx);

        channel.publish(Activity::Playing {
            title: "Stay".into(),
            artist: "Justin Bieber".into(),
        });
        channel.publish(Activity::Idle);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.user_id, "user_42");
        assert_eq!(first.activity, "Playing Stay by Justin Bieber");
        assert_eq!(rx.try_recv().unwrap().activity, "Idle");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn anonymous_session_sends_nothing() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let channel = PresenceChannel::new(Session::anonymous(), tx);

        channel.publish(Activity::Idle);
        assert!(rx.try_recv().is_err());
        assert!(!channel.session().is_authenticated());
    }

    #[test]
    fn closed_forwarder_does_not_panic() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let channel = PresenceChannel::new(Session::authenticated("u"), tx);
        channel.publish(Activity::Idle);
    }
}
