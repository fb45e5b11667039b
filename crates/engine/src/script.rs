use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of dialogue segments merged into one scene.
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Maximum distance (seconds) between a segment and a scene context for the
/// two to be associated.
pub const CONTEXT_WINDOW_SECONDS: f64 = 5.0;

/// Origin of a segment's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Voice,
    Screen,
    Both,
    #[serde(other)]
    Unknown,
}

impl Default for Source {
    fn default() -> Self {
        Source::Unknown
    }
}

impl Source {
    pub fn is_voice(self) -> bool {
        matches!(self, Source::Voice | Source::Both)
    }

    pub fn is_screen(self) -> bool {
        matches!(self, Source::Screen | Source::Both)
    }
}

/// Sparse timeline marker describing what is happening at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    #[serde(default, alias = "timestamp")]
    pub timestamp_seconds: f64,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub scene_type: String,
}

/// One timestamped unit of spoken or on-screen text, as read from
/// `merged_text_content.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default = "default_timestamp")]
    pub timestamp: String,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub text: String,
}

fn default_timestamp() -> String {
    "[00:00:00]".to_string()
}

/// Intermediate entry produced by the annotation pass: either a context
/// switch marker or a dialogue row tagged with the active context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptSegment {
    SceneInfo {
        timestamp: String,
        timestamp_seconds: f64,
        activity: String,
        location: String,
        mood: String,
        scene_type: String,
    },
    Dialogue {
        timestamp: String,
        timestamp_seconds: f64,
        source: Source,
        text: String,
        activity: String,
        location: String,
        mood: String,
    },
}

/// A merged group of consecutive dialogue segments, one screenplay unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub scene_id: usize,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub duration_seconds: f64,
    pub dialogue_count: usize,
    pub content: String,
    pub has_voice: bool,
    pub has_screen: bool,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub scene_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptMetadata {
    pub total_segments: usize,
    pub voice_segments: usize,
    pub screen_segments: usize,
    pub scene_count: usize,
    pub original_segments: usize,
}

/// Template signature blocks, passed through from the extracted template
/// without interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    #[serde(default = "empty_object")]
    pub visual_signature: Value,
    #[serde(default = "empty_object")]
    pub audio_signature: Value,
    #[serde(default = "empty_object")]
    pub emotion_tone: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl Default for TemplateInfo {
    fn default() -> Self {
        TemplateInfo {
            visual_signature: empty_object(),
            audio_signature: empty_object(),
            emotion_tone: empty_object(),
        }
    }
}

/// The merged script document written to `script.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub template_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub metadata: ScriptMetadata,
    #[serde(default)]
    pub template_info: TemplateInfo,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

/// Contents of `scene_contexts.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneContextsFile {
    #[serde(default)]
    pub scenes: Vec<SceneContext>,
    #[serde(default)]
    pub total_scenes: usize,
}

/// Contents of `extracted_template.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    #[serde(default)]
    pub template_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "empty_object")]
    pub visual_signature: Value,
    #[serde(default = "empty_object")]
    pub audio_signature: Value,
    #[serde(default = "empty_object")]
    pub emotion_tone: Value,
}

/// Contents of `merged_text_content.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedTextFile {
    #[serde(default)]
    pub merged_segments: Vec<RawSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_flags() {
        assert!(Source::Voice.is_voice());
        assert!(!Source::Voice.is_screen());
        assert!(Source::Both.is_voice());
        assert!(Source::Both.is_screen());
        assert!(!Source::Unknown.is_voice());
    }

    #[test]
    fn unknown_source_string_collapses() {
        let s: Source = serde_json::from_str("\"SUBTITLE\"").unwrap();
        assert_eq!(s, Source::Unknown);
        let s: Source = serde_json::from_str("\"SCREEN\"").unwrap();
        assert_eq!(s, Source::Screen);
    }

    #[test]
    fn scene_context_accepts_legacy_timestamp_field() {
        let ctx: SceneContext =
            serde_json::from_str(r#"{"timestamp": 12.5, "activity": "walking"}"#).unwrap();
        assert_eq!(ctx.timestamp_seconds, 12.5);
        assert_eq!(ctx.location, "");
    }

    #[test]
    fn partial_segment_gets_defaults() {
        let seg: RawSegment = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(seg.timestamp, "[00:00:00]");
        assert_eq!(seg.source, Source::Unknown);
    }
}
