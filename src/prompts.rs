//! Fixed instructions sent to the provider.
//!
//! Neither text is interpreted locally. Framing, lighting and aspect ratio are
//! plain-language instructions to the models.

/// Instruction sent alongside the photo to the multimodal model.
pub const ANALYSIS_PROMPT: &str = "Analyze this person's identity, gender, mood, age, and all \
accessories (glasses, jewelry, hats, etc.). Then create a macro photography of a small \
handcrafted white plaster bust sculpture (head and elongated neck only) that preserves all \
these characteristics. The sculpture must be: unpainted white plaster with smooth yet textured \
surface, high-fashion art doll aesthetic with hyper-exaggerated proportions (oversized head, \
elongated neck, thin elegant forms, delicate sculpted facial features), cartoon-like elegance \
with fashion-doll surreal exaggeration. Place the bust front-facing on a clean plaster cubic \
stand, centered in frame, surrounded by free space. Plain white background, cinematic \
studio-like lighting emphasizing sculptural depth and polished plaster qualities. \
Ultra-realistic macro capture, frontal view. 3:4 vertical aspect ratio.";

/// Style template appended after the photo description.
pub const STYLE_TEMPLATE: &str = "Create a macro photography of a small handcrafted white \
plaster bust sculpture incorporating these characteristics. Head and elongated neck only, \
unpainted smooth yet textured plaster surface. High-fashion art doll aesthetic with \
hyper-exaggerated proportions: oversized head, elongated neck, thin elegant forms, delicate \
sculpted facial features. Cartoon-like elegance with fashion-doll surreal exaggeration. \
Front-facing on a clean plaster cubic stand, centered in frame, surrounded by free space. \
Plain white background, cinematic studio-like lighting emphasizing sculptural depth. \
Ultra-realistic macro capture.";

/// Builds the image prompt from the photo description.
///
/// An empty description still yields a usable prompt, it just carries no
/// likeness cues.
pub fn compose_generation_prompt(analysis: &str) -> String {
    format!("{analysis}\n\n{STYLE_TEMPLATE}")
}
