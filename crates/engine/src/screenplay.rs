use std::sync::LazyLock;

use regex::Regex;

use crate::script::{Scene, Script};

/// Dialogue lines longer than this are word-wrapped.
const MAX_DIALOGUE_LINE_CHARS: usize = 100;

/// Scene titles at or above this length fall back to the scene type.
const MAX_TITLE_CHARS: usize = 50;

const BANNER_WIDTH: usize = 80;

/// Dialogue parts are separated by runs of two or more whitespace characters.
static PART_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Derive a scene heading from the activity, falling back to the scene type.
///
/// Takes the text before the first comma or parenthesis; keyword tests here
/// and below match both the English keyword and its Korean counterpart, since
/// source material carries either.
fn scene_title(activity: &str, scene_type: &str) -> String {
    if !activity.is_empty() {
        let head = activity.split(',').next().unwrap_or(activity);
        let head = head.split('(').next().unwrap_or(head).trim();
        if head.chars().count() < MAX_TITLE_CHARS {
            return head.to_string();
        }
    }
    if scene_type.is_empty() {
        "Scene".to_string()
    } else {
        scene_type.to_string()
    }
}

/// Infer a time-of-day label from keywords in the location.
fn time_of_day(location: &str) -> &'static str {
    let loc = location.to_lowercase();
    if loc.contains("morning") || loc.contains("아침") {
        "MORNING"
    } else if loc.contains("night") || loc.contains("밤") || loc.contains("evening") {
        "EVENING"
    } else if loc.contains("sunset") || loc.contains("일몰") {
        "DUSK"
    } else if loc.contains("noon") || loc.contains("정오") {
        "NOON"
    } else {
        "DAY"
    }
}

/// Synthesize a visual description from location and activity keywords.
///
/// Each keyword fires independently and every fired sentence is kept, in this
/// fixed order.
fn visual_description(activity: &str, location: &str) -> String {
    let act = activity.to_lowercase();
    let loc = location.to_lowercase();
    let mut elements: Vec<&str> = Vec::new();

    if loc.contains("indoor") || loc.contains("실내") {
        elements.push("The interior surroundings come into view");
    }
    if loc.contains("outdoor") || loc.contains("야외") {
        elements.push("An open-air landscape fills the frame");
    }
    if act.contains("walking") || act.contains("걷는") {
        elements.push("The camera follows a figure in motion");
    }
    if act.contains("sitting") || act.contains("앉아있는") {
        elements.push("A still, relaxed composition holds");
    }
    if act.contains("talking") || act.contains("말하는") {
        elements.push("Close-ups trade back and forth as the conversation flows");
    }
    if act.contains("working") || act.contains("일하는") {
        elements.push("Hands at work, held in tight focus");
    }

    if elements.is_empty() {
        "A scene unfolds".to_string()
    } else {
        elements.join(". ")
    }
}

/// Format the scene's content into tagged dialogue lines.
///
/// Voice and screen together still tag as `[VOICE]`; there is no combined
/// tag.
pub fn format_dialogue(content: &str, has_voice: bool, has_screen: bool) -> Vec<String> {
    if content.chars().count() < 2 {
        return Vec::new();
    }

    let tag = if has_voice && has_screen {
        "[VOICE]"
    } else if has_voice {
        "[VOICE]"
    } else if has_screen {
        "[SCREEN TEXT]"
    } else {
        "[NARRATOR]"
    };

    let mut dialogues = Vec::new();
    for part in PART_SPLIT.split(content) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if part.chars().count() > MAX_DIALOGUE_LINE_CHARS {
            // Greedy word wrap; a single word never breaks mid-word even when
            // it alone exceeds the limit.
            let mut line: Vec<&str> = Vec::new();
            let mut length = 0usize;
            for word in part.split_whitespace() {
                let word_len = word.chars().count();
                if !line.is_empty() && length + word_len + 1 > MAX_DIALOGUE_LINE_CHARS {
                    dialogues.push(format!("{tag}\n{}", line.join(" ")));
                    line = vec![word];
                    length = word_len;
                } else {
                    line.push(word);
                    length += word_len + 1;
                }
            }
            if !line.is_empty() {
                dialogues.push(format!("{tag}\n{}", line.join(" ")));
            }
        } else {
            dialogues.push(format!("{tag}\n{part}"));
        }
    }

    dialogues
}

/// Render one scene as a framed screenplay block.
pub fn render_scene(scene: &Scene) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("---".to_string());
    lines.push(format!(
        "SCENE TITLE: {}",
        scene_title(&scene.activity, &scene.scene_type)
    ));
    lines.push(format!("LOCATION: {}", scene.location));
    lines.push(format!("TIME: {}", time_of_day(&scene.location)));
    lines.push(format!("MOOD: {}", scene.mood));
    lines.push(String::new());

    lines.push("[ACTION / VISUAL DESCRIPTION]".to_string());
    lines.push(format!(
        "{}.",
        visual_description(&scene.activity, &scene.location)
    ));
    if !scene.scene_type.is_empty() {
        lines.push(format!("Scene type: {}", scene.scene_type));
    }
    lines.push(String::new());

    if scene.content.chars().count() >= 2 {
        lines.push("[DIALOGUE]".to_string());
        lines.extend(format_dialogue(
            &scene.content,
            scene.has_voice,
            scene.has_screen,
        ));
        lines.push(String::new());
    }

    lines.push("[NARRATION / VOICE-OVER]".to_string());
    if !scene.mood.is_empty() {
        lines.push(format!("A {} mood fills the scene.", scene.mood));
    }
    if !scene.activity.is_empty() {
        lines.push(scene.activity.clone());
    }
    lines.push(String::new());

    lines.push("---".to_string());
    lines.join("\n")
}

/// Render the whole script: banner header, then every scene in order.
pub fn render_screenplay(script: &Script) -> String {
    let banner = "=".repeat(BANNER_WIDTH);
    let mut lines: Vec<String> = vec![
        banner.clone(),
        format!("TITLE: {}", script.template_name),
        format!("CATEGORY: {}", script.category),
        format!("TOTAL SCENES: {}", script.scenes.len()),
        banner,
        String::new(),
    ];

    for scene in &script.scenes {
        lines.push(render_scene(scene));
        lines.push(String::new());
    }

    lines.join("\n")
}
