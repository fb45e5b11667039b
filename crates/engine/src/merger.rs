use crate::script::*;
use crate::timestamp::parse_timestamp;

/// Find the scene context temporally nearest to `timestamp`.
///
/// Only accepted when the minimum distance is strictly under the 5 second
/// window; ties go to the first context in scan order.
pub fn find_closest_context<'a>(
    timestamp: f64,
    contexts: &'a [SceneContext],
) -> Option<&'a SceneContext> {
    let mut closest: Option<&SceneContext> = None;
    let mut min_diff = f64::INFINITY;

    for ctx in contexts {
        let diff = (timestamp - ctx.timestamp_seconds).abs();
        if diff < min_diff {
            min_diff = diff;
            closest = Some(ctx);
        }
    }

    if min_diff < CONTEXT_WINDOW_SECONDS {
        closest
    } else {
        None
    }
}

/// Annotation pass over the raw segments.
///
/// Walks the input in order, tracking the currently active context as a local
/// accumulator. When the nearest context changes, a `scene_info` marker is
/// emitted before the dialogue row; every dialogue row carries the active
/// context's activity/location/mood (empty until a context first matches).
pub fn annotate_segments(
    segments: &[RawSegment],
    contexts: &[SceneContext],
) -> Vec<ScriptSegment> {
    let mut out = Vec::with_capacity(segments.len());
    let mut current: Option<&SceneContext> = None;

    for seg in segments {
        let seconds = parse_timestamp(&seg.timestamp);

        if let Some(ctx) = find_closest_context(seconds, contexts) {
            if current != Some(ctx) {
                out.push(ScriptSegment::SceneInfo {
                    timestamp: seg.timestamp.clone(),
                    timestamp_seconds: seconds,
                    activity: ctx.activity.clone(),
                    location: ctx.location.clone(),
                    mood: ctx.mood.clone(),
                    scene_type: ctx.scene_type.clone(),
                });
                current = Some(ctx);
            }
        }

        let (activity, location, mood) = match current {
            Some(c) => (c.activity.clone(), c.location.clone(), c.mood.clone()),
            None => (String::new(), String::new(), String::new()),
        };

        out.push(ScriptSegment::Dialogue {
            timestamp: seg.timestamp.clone(),
            timestamp_seconds: seconds,
            source: seg.source,
            text: seg.text.clone(),
            activity,
            location,
            mood,
        });
    }

    out
}

struct DialogueRow<'a> {
    timestamp: &'a str,
    seconds: f64,
    source: Source,
    text: &'a str,
}

fn dialogue_rows(segments: &[ScriptSegment]) -> Vec<DialogueRow<'_>> {
    segments
        .iter()
        .filter_map(|seg| match seg {
            ScriptSegment::Dialogue {
                timestamp,
                timestamp_seconds,
                source,
                text,
                ..
            } => Some(DialogueRow {
                timestamp: timestamp.as_str(),
                seconds: *timestamp_seconds,
                source: *source,
                text: text.as_str(),
            }),
            _ => None,
        })
        .collect()
}

/// Partition the dialogue rows into consecutive chunks of `chunk_size` and
/// build one `Scene` per chunk. The synthetic `scene_info` markers are
/// dropped here; context fields come from an independent first-match lookup
/// against the scene contexts within the 5 second window of each chunk's
/// first row.
pub fn merge_scenes(
    segments: &[ScriptSegment],
    contexts: &[SceneContext],
    chunk_size: usize,
) -> Vec<Scene> {
    let rows = dialogue_rows(segments);
    let mut scenes = Vec::new();

    for (index, chunk) in rows.chunks(chunk_size.max(1)).enumerate() {
        let first = &chunk[0];
        let last = &chunk[chunk.len() - 1];

        let context = contexts
            .iter()
            .find(|c| (c.timestamp_seconds - first.seconds).abs() < CONTEXT_WINDOW_SECONDS);

        let content = chunk
            .iter()
            .filter(|r| !r.text.is_empty())
            .map(|r| r.text)
            .collect::<Vec<_>>()
            .join(" ");

        scenes.push(Scene {
            scene_id: index + 1,
            start_timestamp: first.timestamp.to_string(),
            end_timestamp: last.timestamp.to_string(),
            start_seconds: first.seconds,
            end_seconds: last.seconds,
            duration_seconds: last.seconds - first.seconds,
            dialogue_count: chunk.len(),
            content,
            has_voice: chunk.iter().any(|r| r.source.is_voice()),
            has_screen: chunk.iter().any(|r| r.source.is_screen()),
            activity: context.map(|c| c.activity.clone()).unwrap_or_default(),
            location: context.map(|c| c.location.clone()).unwrap_or_default(),
            mood: context.map(|c| c.mood.clone()).unwrap_or_default(),
            scene_type: context.map(|c| c.scene_type.clone()).unwrap_or_default(),
        });
    }

    scenes
}

/// Assemble the full script document for one template.
pub fn build_script(
    contexts_file: &SceneContextsFile,
    template: &TemplateFile,
    merged: &MergedTextFile,
    chunk_size: usize,
) -> Script {
    let annotated = annotate_segments(&merged.merged_segments, &contexts_file.scenes);
    let scenes = merge_scenes(&annotated, &contexts_file.scenes, chunk_size);

    let rows = dialogue_rows(&annotated);
    let voice_segments = rows.iter().filter(|r| r.source.is_voice()).count();
    let screen_segments = rows.iter().filter(|r| r.source.is_screen()).count();

    Script {
        template_name: template.template_name.clone(),
        category: template.category.clone(),
        metadata: ScriptMetadata {
            total_segments: scenes.len(),
            voice_segments,
            screen_segments,
            scene_count: contexts_file.total_scenes,
            original_segments: rows.len(),
        },
        template_info: TemplateInfo {
            visual_signature: template.visual_signature.clone(),
            audio_signature: template.audio_signature.clone(),
            emotion_tone: template.emotion_tone.clone(),
        },
        scenes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(t: f64, activity: &str) -> SceneContext {
        SceneContext {
            timestamp_seconds: t,
            activity: activity.to_string(),
            location: format!("loc-{activity}"),
            mood: format!("mood-{activity}"),
            scene_type: format!("type-{activity}"),
        }
    }

    fn seg(timestamp: &str, source: Source, text: &str) -> RawSegment {
        RawSegment {
            timestamp: timestamp.to_string(),
            source,
            text: text.to_string(),
        }
    }

    #[test]
    fn closest_context_within_window() {
        let contexts = vec![ctx(0.0, "a"), ctx(10.0, "b"), ctx(20.0, "c")];
        let hit = find_closest_context(6.0, &contexts).unwrap();
        assert_eq!(hit.activity, "b");
    }

    #[test]
    fn closest_context_prefers_nearest_not_first() {
        let contexts = vec![ctx(0.0, "a"), ctx(10.0, "b"), ctx(20.0, "c")];
        let hit = find_closest_context(16.0, &contexts).unwrap();
        assert_eq!(hit.activity, "c");
    }

    #[test]
    fn closest_context_tie_goes_to_scan_order() {
        let contexts = vec![ctx(10.0, "a"), ctx(14.0, "b")];
        let hit = find_closest_context(12.0, &contexts).unwrap();
        assert_eq!(hit.activity, "a");
    }

    #[test]
    fn closest_context_outside_window_is_none() {
        let contexts = vec![ctx(0.0, "a"), ctx(10.0, "b"), ctx(20.0, "c")];
        assert!(find_closest_context(50.0, &contexts).is_none());
        // Exactly on the boundary does not match; the window is strict.
        assert!(find_closest_context(25.0, &contexts).is_none());
    }

    #[test]
    fn annotation_interleaves_context_switches() {
        let contexts = vec![ctx(0.0, "intro"), ctx(30.0, "main")];
        let segments = vec![
            seg("[00:00:01]", Source::Voice, "one"),
            seg("[00:00:02]", Source::Voice, "two"),
            seg("[00:00:31]", Source::Voice, "three"),
        ];

        let annotated = annotate_segments(&segments, &contexts);
        let kinds: Vec<&str> = annotated
            .iter()
            .map(|s| match s {
                ScriptSegment::SceneInfo { .. } => "info",
                ScriptSegment::Dialogue { .. } => "dialogue",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["info", "dialogue", "dialogue", "info", "dialogue"]
        );

        // The last dialogue row carries the switched context.
        match annotated.last().unwrap() {
            ScriptSegment::Dialogue { activity, .. } => assert_eq!(activity, "main"),
            _ => panic!("expected dialogue"),
        }
    }

    #[test]
    fn context_stays_active_when_no_match() {
        let contexts = vec![ctx(0.0, "intro")];
        let segments = vec![
            seg("[00:00:01]", Source::Voice, "near"),
            seg("[00:10:00]", Source::Voice, "far"),
        ];

        let annotated = annotate_segments(&segments, &contexts);
        match annotated.last().unwrap() {
            ScriptSegment::Dialogue { activity, .. } => assert_eq!(activity, "intro"),
            _ => panic!("expected dialogue"),
        }
    }

    #[test]
    fn chunks_of_twentyfive_make_three_scenes() {
        let segments: Vec<RawSegment> = (0..25)
            .map(|i| seg(&format!("[00:00:{i:02}]"), Source::Voice, &format!("t{i}")))
            .collect();
        let annotated = annotate_segments(&segments, &[]);
        let scenes = merge_scenes(&annotated, &[], 10);

        assert_eq!(scenes.len(), 3);
        let counts: Vec<usize> = scenes.iter().map(|s| s.dialogue_count).collect();
        assert_eq!(counts, vec![10, 10, 5]);
        let ids: Vec<usize> = scenes.iter().map(|s| s.scene_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn scene_content_round_trips_segment_texts() {
        let segments = vec![
            seg("[00:00]", Source::Voice, "alpha"),
            seg("[00:01]", Source::Screen, "beta"),
            seg("[00:02]", Source::Voice, ""),
            seg("[00:03]", Source::Voice, "gamma"),
        ];
        let annotated = annotate_segments(&segments, &[]);
        let scenes = merge_scenes(&annotated, &[], 10);

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].content, "alpha beta gamma");
        assert!(scenes[0].has_voice);
        assert!(scenes[0].has_screen);
        assert_eq!(scenes[0].duration_seconds, 3.0);
    }

    #[test]
    fn single_segment_scene_has_zero_duration() {
        let segments = vec![seg("[00:07]", Source::Both, "only")];
        let annotated = annotate_segments(&segments, &[]);
        let scenes = merge_scenes(&annotated, &[], 10);

        assert_eq!(scenes[0].duration_seconds, 0.0);
        assert!(scenes[0].has_voice);
        assert!(scenes[0].has_screen);
    }

    #[test]
    fn chunk_context_is_first_within_window() {
        // Both contexts are inside the window of the chunk head; the first in
        // scan order wins even though the second is nearer.
        let contexts = vec![ctx(4.0, "far"), ctx(1.0, "near")];
        let segments = vec![seg("[00:00]", Source::Voice, "x")];
        let annotated = annotate_segments(&segments, &contexts);
        let scenes = merge_scenes(&annotated, &contexts, 10);
        assert_eq!(scenes[0].activity, "far");
    }

    #[test]
    fn build_script_counts_sources() {
        let contexts_file = SceneContextsFile {
            scenes: vec![ctx(0.0, "a")],
            total_scenes: 7,
        };
        let template = TemplateFile {
            template_name: "demo".to_string(),
            category: "travel".to_string(),
            ..serde_json::from_str("{}").unwrap()
        };
        let merged = MergedTextFile {
            merged_segments: vec![
                seg("[00:00]", Source::Voice, "v"),
                seg("[00:01]", Source::Screen, "s"),
                seg("[00:02]", Source::Both, "b"),
                seg("[00:03]", Source::Unknown, "u"),
            ],
        };

        let script = build_script(&contexts_file, &template, &merged, 10);
        assert_eq!(script.template_name, "demo");
        assert_eq!(script.metadata.total_segments, 1);
        assert_eq!(script.metadata.original_segments, 4);
        assert_eq!(script.metadata.voice_segments, 2);
        assert_eq!(script.metadata.screen_segments, 2);
        assert_eq!(script.metadata.scene_count, 7);
    }
}
