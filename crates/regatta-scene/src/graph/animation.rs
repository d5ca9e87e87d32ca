use crate::graph::Model;
use regatta_math::*;
use std::collections::HashMap;

/// A timestamped sample on one transform channel. Keyframe times are
/// seconds, as stored in the asset; elapsed playback time is milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFrame<T> {
    pub time: f32,
    pub value: T,
}

/// Values a channel can interpolate between two keyframes.
pub trait Interpolate: Copy {
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl Interpolate for Quat {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        slerp(a, b, t)
    }
}

/// The three keyframe channels of one animated node.
///
/// Any channel may be empty; sampling an empty channel yields that
/// component's identity (zero translation, identity rotation, unit scale).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChannels {
    pub translation: Vec<KeyFrame<Vec3>>,
    pub rotation: Vec<KeyFrame<Quat>>,
    pub scale: Vec<KeyFrame<Vec3>>,
}

impl NodeChannels {
    pub fn is_empty(&self) -> bool {
        self.translation.is_empty() && self.rotation.is_empty() && self.scale.is_empty()
    }

    /// Samples all three channels at once, substituting identity values for
    /// empty channels.
    pub fn sample_trs(&self, elapsed_millis: f32) -> (Vec3, Quat, Vec3) {
        (
            sample(&self.translation, elapsed_millis).unwrap_or(Vec3::ZERO),
            sample(&self.rotation, elapsed_millis).unwrap_or(Quat::IDENTITY),
            sample(&self.scale, elapsed_millis).unwrap_or(Vec3::ONE),
        )
    }
}

/// Keyframe channels of one clip, keyed by target node index. Built once at
/// load time and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    pub channels: HashMap<usize, NodeChannels>,
}

/// Samples a keyframe channel at `elapsed_millis`, looping over the
/// channel's duration.
///
/// A single keyframe is returned as-is at any elapsed time. Otherwise the
/// playback time wraps at the last keyframe's timestamp and the bracketing
/// pair is interpolated. Adjacent keyframes sharing a timestamp collapse
/// the window; the progression is pinned to the boundary instead of
/// dividing by zero.
pub fn sample<T: Interpolate>(key_frames: &[KeyFrame<T>], elapsed_millis: f32) -> Option<T> {
    let first = key_frames.first()?;
    if key_frames.len() == 1 {
        return Some(first.value);
    }

    let duration = key_frames[key_frames.len() - 1].time;
    if duration <= 0.0 {
        return Some(first.value);
    }
    let time = (elapsed_millis / 1000.0) % duration;

    let (previous, next) = bracketing_pair(key_frames, time);
    let window = next.time - previous.time;
    let progression = if window > 0.0 {
        (time - previous.time) / window
    } else {
        0.0
    };

    Some(T::interpolate(previous.value, next.value, progression))
}

/// Finds the first keyframe whose time exceeds `time` and the keyframe
/// before it. A time before the first keyframe brackets to the first
/// keyframe on both sides. The scan is linear and tolerates unsorted input.
fn bracketing_pair<T>(key_frames: &[KeyFrame<T>], time: f32) -> (&KeyFrame<T>, &KeyFrame<T>) {
    if time < key_frames[0].time {
        return (&key_frames[0], &key_frames[0]);
    }

    let mut previous = &key_frames[0];
    let mut next = &key_frames[0];
    for frame in &key_frames[1..] {
        next = frame;
        if next.time > time {
            break;
        }
        previous = frame;
    }
    (previous, next)
}

/// A clip currently playing on a blend channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAnimation {
    pub name: String,
    /// Elapsed playback time in milliseconds.
    pub elapsed: f32,
}

/// Runtime playback state.
///
/// Clips play on named blend channels ("locomotion", "upper-body", ...).
/// Within a channel the newest clip cross-fades in over the blend duration
/// and then dominates; clips on different channels never interact.
#[derive(Debug, Clone)]
pub struct AnimationState {
    channels: HashMap<String, Vec<ActiveAnimation>>,
    blend_time: f32,
}

impl AnimationState {
    /// `blend_time` is the cross-fade duration in milliseconds; zero
    /// disables blending entirely.
    pub fn new(blend_time: f32) -> Self {
        Self {
            channels: HashMap::new(),
            blend_time,
        }
    }

    pub fn blend_time(&self) -> f32 {
        self.blend_time
    }

    /// Starts a clip on a blend channel. Requesting the clip that is
    /// already newest on the channel is a no-op.
    pub fn play(&mut self, channel: &str, animation: &str) {
        let list = self.channels.entry(channel.to_string()).or_default();
        if list.last().map(|active| active.name.as_str()) == Some(animation) {
            return;
        }
        list.push(ActiveAnimation {
            name: animation.to_string(),
            elapsed: 0.0,
        });
    }

    /// Advances every active clip by `delta_millis` and retires clips
    /// superseded by a newer clip that has finished fading in.
    pub fn advance(&mut self, delta_millis: f32) {
        let blend_time = self.blend_time;
        for list in self.channels.values_mut() {
            for active in list.iter_mut() {
                active.elapsed += delta_millis;
            }
            if let Some(dominant) = list.iter().rposition(|active| active.elapsed >= blend_time) {
                list.drain(..dominant);
            }
        }
    }

    /// Stops everything playing on a blend channel.
    pub fn stop(&mut self, channel: &str) {
        self.channels.remove(channel);
    }

    pub fn is_playing(&self, channel: &str, animation: &str) -> bool {
        self.channels
            .get(channel)
            .map_or(false, |list| list.iter().any(|active| active.name == animation))
    }

    pub fn active(&self) -> &HashMap<String, Vec<ActiveAnimation>> {
        &self.channels
    }
}

/// Blends every active clip into one local transform per animated node.
///
/// Each clip's weight is `-((elapsed - blend_time) / blend_time)`: full at
/// elapsed 0, fading linearly to zero at `blend_time`. While the weight is
/// positive the clip pulls its nodes toward every competing clip on the
/// same blend channel by that weight; a negative (or NaN, when blend_time
/// is zero) weight disables the cross-fade so the clip simply overrides its
/// nodes. The final local matrix is `translate * rotate * scale`.
pub fn animation_transforms(
    model: &Model,
    active: &HashMap<String, Vec<ActiveAnimation>>,
    blend_time: f32,
) -> HashMap<usize, Mat4> {
    let mut transforms = HashMap::new();

    for list in active.values() {
        for root in list {
            let animation = match model.animations.get(&root.name) {
                Some(animation) => animation,
                None => continue,
            };
            let blend = -((root.elapsed - blend_time) / blend_time);

            for (&node, channels) in &animation.channels {
                let (mut translation, mut rotation, mut scale) = channels.sample_trs(root.elapsed);

                if blend > 0.0 {
                    for other in list {
                        if other.name == root.name {
                            continue;
                        }
                        let (t, r, s) = model
                            .animations
                            .get(&other.name)
                            .and_then(|animation| animation.channels.get(&node))
                            .map(|channels| channels.sample_trs(other.elapsed))
                            .unwrap_or((Vec3::ZERO, Quat::IDENTITY, Vec3::ONE));

                        translation = translation.lerp(t, blend);
                        rotation = slerp(rotation, r, blend);
                        scale = scale.lerp(s, blend);
                    }
                }

                transforms.insert(node, compose_trs(translation, rotation, scale));
            }
        }
    }

    transforms
}
