use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::data::{Animation, Keyframe};
use crate::error::{check_time, TimelineError};
use crate::ids::{AnimationId, KeyframeId, ObjectId, SceneId};
use crate::store::Store;
use crate::value::{Property, Value};
use crate::Result;

/// Public API: load a stored timeline document into the store.
///
/// Notes:
/// - Animations carry their keyframes nested; property names are strings.
/// - Values are a bare number/bool or an object `{ "value": .. }` with extra
///   fields, which are kept under the keyframe's `valueMeta` extra.
/// - Unknown keyframe fields travel along in `Keyframe::extras`.
/// - The whole document is validated before anything is inserted; loaded
///   entities are not forwarded to persistence.
/// - An object may appear at most once per document.
/// - Ids are kept when free, else reallocated past every kept id.
///
/// Returns the loaded animation ids in document order.
pub fn load_stored_timeline(store: &mut Store, json: &str) -> Result<Vec<AnimationId>> {
    let doc = parse_stored_timeline(json)?;
    let mut staged = stage(store, doc)?;

    let mut kept_anims: HashSet<AnimationId> = HashSet::new();
    let mut kept_keys: HashSet<KeyframeId> = HashSet::new();
    for anim in &mut staged {
        anim.id = match anim.id {
            Some(id)
                if store.animation(id).map_or(true, |a| a.object == anim.object)
                    && kept_anims.insert(id) =>
            {
                Some(id)
            }
            _ => None,
        };
        for key in &mut anim.keys {
            key.id = match key.id {
                Some(kid) if !store.contains_keyframe(kid) && kept_keys.insert(kid) => Some(kid),
                _ => None,
            };
        }
    }
    for id in &kept_anims {
        store.observe_animation_id(*id);
    }
    for kid in &kept_keys {
        store.observe_keyframe_id(*kid);
    }

    let default_ease = store.default_ease().to_string();
    let mut loaded = Vec::with_capacity(staged.len());
    for anim in staged {
        let id = anim.id.unwrap_or_else(|| store.alloc_animation_id());
        let keyframes: Vec<Keyframe> = anim
            .keys
            .into_iter()
            .map(|k| Keyframe {
                id: k.id.unwrap_or_else(|| store.alloc_keyframe_id()),
                animation: id,
                time: k.time,
                property: k.property,
                value: k.value,
                ease: k.ease.unwrap_or_else(|| default_ease.clone()),
                locked: k.locked,
                extras: k.extras,
            })
            .collect();
        store.insert_loaded(
            Animation {
                id,
                object: anim.object,
                scene: anim.scene,
                duration: anim.duration,
                r#loop: anim.r#loop,
                autoplay: anim.autoplay,
                playback_rate: anim.playback_rate,
                order: anim.order,
            },
            keyframes,
        )?;
        loaded.push(id);
    }
    Ok(loaded)
}

/// Validate every animation and keyframe without touching the store.
fn stage(store: &Store, doc: StoredTimeline) -> Result<Vec<StagedAnimation>> {
    let default_duration = store.default_duration();
    let mut objects: HashSet<ObjectId> = HashSet::new();
    let mut staged = Vec::with_capacity(doc.animations.len());
    for sa in doc.animations {
        let object = ObjectId::new(sa.object_id);
        if !objects.insert(object.clone()) {
            return Err(TimelineError::DuplicateObject {
                object: object.as_str().to_string(),
            });
        }
        let duration = sa.duration.unwrap_or(default_duration);
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TimelineError::InvalidDuration { duration });
        }
        let playback_rate = sa.playback_rate.unwrap_or(1.0);
        if !playback_rate.is_finite() || playback_rate <= 0.0 {
            return Err(TimelineError::InvalidPlaybackRate {
                rate: playback_rate,
            });
        }
        let mut keys = Vec::with_capacity(sa.keyframes.len());
        for sk in sa.keyframes {
            let time = check_time(sk.time)?;
            let property = Property::parse(&sk.property)?;
            let (value, meta) = sk.value.into_core();
            value.check_for(property)?;
            let mut extras = sk.extras;
            if let Some(meta) = meta.filter(|m| !m.is_empty()) {
                extras.insert("valueMeta".to_string(), serde_json::Value::Object(meta));
            }
            keys.push(StagedKey {
                id: sk.id.map(KeyframeId),
                time,
                property,
                value,
                ease: sk.ease,
                locked: sk.locked,
                extras,
            });
        }
        staged.push(StagedAnimation {
            id: sa.id.map(AnimationId),
            object,
            scene: sa.scene_id.map(SceneId::new),
            duration,
            r#loop: sa.r#loop,
            autoplay: sa.autoplay,
            playback_rate,
            order: sa.order.unwrap_or(0),
            keys,
        });
    }
    Ok(staged)
}

/// Parse without touching a store.
pub fn parse_stored_timeline(json: &str) -> Result<StoredTimeline> {
    serde_json::from_str(json).map_err(|e| TimelineError::Serialization {
        reason: format!("stored timeline: {e}"),
    })
}

/// Snapshot the store in the stored document shape.
pub fn export_stored_timeline(store: &Store) -> StoredTimeline {
    let animations = store
        .animations()
        .into_iter()
        .map(|a| StoredAnimation {
            id: Some(a.id.0),
            object_id: a.object.as_str().to_string(),
            scene_id: a.scene.as_ref().map(|s| s.as_str().to_string()),
            duration: Some(a.duration),
            r#loop: a.r#loop,
            autoplay: a.autoplay,
            playback_rate: Some(a.playback_rate),
            order: Some(a.order),
            keyframes: store
                .keyframes_of(a.id)
                .into_iter()
                .map(|k| StoredKeyframe {
                    id: Some(k.id.0),
                    time: k.time,
                    property: k.property.name().to_string(),
                    value: match k.value {
                        Value::Number(n) => RawValue::Number(n as f64),
                        Value::Bool(b) => RawValue::Boolean(b),
                    },
                    ease: Some(k.ease.clone()),
                    locked: k.locked,
                    extras: k.extras.clone(),
                })
                .collect(),
        })
        .collect();
    StoredTimeline { animations }
}

struct StagedAnimation {
    id: Option<AnimationId>,
    object: ObjectId,
    scene: Option<SceneId>,
    duration: f32,
    r#loop: bool,
    autoplay: bool,
    playback_rate: f32,
    order: u32,
    keys: Vec<StagedKey>,
}

struct StagedKey {
    id: Option<KeyframeId>,
    time: f32,
    property: Property,
    value: Value,
    ease: Option<String>,
    locked: bool,
    extras: serde_json::Map<String, serde_json::Value>,
}

// ----- JSON schema (serde) -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTimeline {
    #[serde(default)]
    pub animations: Vec<StoredAnimation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnimation {
    #[serde(default)]
    pub id: Option<u32>,
    pub object_id: String,
    #[serde(default)]
    pub scene_id: Option<String>,
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub r#loop: bool,
    #[serde(default)]
    pub autoplay: bool,
    #[serde(default)]
    pub playback_rate: Option<f32>,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub keyframes: Vec<StoredKeyframe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredKeyframe {
    #[serde(default)]
    pub id: Option<u32>,
    pub time: f32,
    pub property: String,
    pub value: RawValue,
    #[serde(default)]
    pub ease: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub extras: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Boolean(bool),
    Number(f64),
    // Wrapped form must come last so bare scalars match first.
    Wrapped {
        value: Scalar,
        #[serde(flatten)]
        meta: serde_json::Map<String, serde_json::Value>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Number(f64),
}

impl RawValue {
    fn into_core(self) -> (Value, Option<serde_json::Map<String, serde_json::Value>>) {
        match self {
            RawValue::Boolean(b) => (Value::Bool(b), None),
            RawValue::Number(n) => (Value::Number(n as f32), None),
            RawValue::Wrapped { value, meta } => {
                let v = match value {
                    Scalar::Boolean(b) => Value::Bool(b),
                    Scalar::Number(n) => Value::Number(n as f32),
                };
                (v, Some(meta))
            }
        }
    }
}
