//! Canned rebuttal selection.
//!
//! The AI opponent argues the inverse of the user's stance. Topics about AI or
//! remote work get a fixed paragraph for that side; anything else gets one of
//! three generic templates, chosen uniformly at random.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::SparringError;
use crate::session::Stance;

/// Shown instead of a rebuttal when response generation fails.
pub const FALLBACK_RESPONSE: &str =
    "Demo mode active - AI responses are simulated for showcase purposes.";

pub const AI_AGAINST: &str = "I understand your support for AI regulation, but I believe market-driven solutions are more effective. Heavy government regulation could stifle innovation and push development to countries with fewer restrictions. The tech industry has shown it can self-regulate through ethical AI initiatives and industry standards. Additionally, regulation often lags behind technology, making rules obsolete before they're implemented.";

pub const AI_FOR: &str = "While innovation is important, your argument overlooks the significant risks of unregulated AI. We've seen how social media algorithms can manipulate behavior and spread misinformation. AI systems making decisions about loans, hiring, and criminal justice need oversight to prevent discrimination. Other industries like pharmaceuticals and aviation are heavily regulated for public safety - AI should be no different.";

pub const REMOTE_WORK_AGAINST: &str = "Remote work may seem convenient, but it fundamentally undermines collaboration and company culture. In-person interactions foster creativity and spontaneous problem-solving that video calls cannot replicate. Many studies show decreased productivity and innovation in fully remote teams. Additionally, remote work creates inequality between those with proper home setups and those without.";

pub const REMOTE_WORK_FOR: &str = "Your points about collaboration have merit, but remote work offers substantial benefits that outweigh these concerns. Companies like GitLab and Buffer have proven that remote-first cultures can be highly productive. Remote work reduces commute time, increases work-life balance, and allows companies to hire the best talent regardless of location. The key is implementing proper remote work practices, not abandoning the model entirely.";

/// Number of generic templates the fallback branch picks from.
pub const GENERIC_TEMPLATE_COUNT: usize = 3;

/// Topic category that decides which paragraphs are eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    ArtificialIntelligence,
    RemoteWork,
    Generic,
}

/// Classify a topic by keyword. Matching is case-insensitive substring search.
pub fn classify_topic(topic: &str) -> TopicKind {
    let topic = topic.to_lowercase();
    if topic.contains("ai") || topic.contains("artificial intelligence") {
        TopicKind::ArtificialIntelligence
    } else if topic.contains("remote work") {
        TopicKind::RemoteWork
    } else {
        TopicKind::Generic
    }
}

/// Pick the opponent's rebuttal for a topic and the user's stance.
pub fn select_rebuttal<R: Rng + ?Sized>(topic: &str, stance: Stance, rng: &mut R) -> String {
    let opponent = stance.invert();

    match classify_topic(topic) {
        TopicKind::ArtificialIntelligence => match opponent {
            Stance::Against => AI_AGAINST.to_string(),
            Stance::For => AI_FOR.to_string(),
        },
        TopicKind::RemoteWork => match opponent {
            Stance::Against => REMOTE_WORK_AGAINST.to_string(),
            Stance::For => REMOTE_WORK_FOR.to_string(),
        },
        TopicKind::Generic => {
            generic_rebuttal(rng.gen_range(0..GENERIC_TEMPLATE_COUNT), topic, opponent)
        }
    }
}

/// Render generic template `index` (taken modulo the template count).
pub fn generic_rebuttal(index: usize, topic: &str, opponent: Stance) -> String {
    let side = opponent.as_lowercase();
    match index % GENERIC_TEMPLATE_COUNT {
        0 => format!(
            "While your arguments have some validity, the {side} position offers a more practical approach to {topic}. Consider the economic implications and long-term sustainability of implementing such policies. Historical precedents suggest that alternative approaches have yielded better outcomes."
        ),
        1 => format!(
            "I appreciate your perspective on {topic}, but I believe you're overlooking crucial counterarguments. The {side} stance addresses several flaws in your reasoning, particularly regarding implementation challenges and unintended consequences that could arise."
        ),
        _ => format!(
            "Your position on {topic} raises interesting points, however, the {side} viewpoint provides a more balanced solution. We must consider stakeholder impacts, resource allocation, and measurable outcomes when evaluating policy effectiveness."
        ),
    }
}

/// Source of the AI opponent's rebuttals.
pub trait RebuttalSource: Send {
    /// Produce a rebuttal to the user's argument on `topic`.
    fn rebuttal(&mut self, topic: &str, stance: Stance) -> Result<String, SparringError>;
}

/// Keyword-matched canned rebuttals with an injected random source.
pub struct CannedRebuttals<R = StdRng> {
    rng: R,
}

impl CannedRebuttals<StdRng> {
    /// Seeded from the OS.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic selection for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for CannedRebuttals<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> CannedRebuttals<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> RebuttalSource for CannedRebuttals<R> {
    fn rebuttal(&mut self, topic: &str, stance: Stance) -> Result<String, SparringError> {
        Ok(select_rebuttal(topic, stance, &mut self.rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_topic() {
        assert_eq!(
            classify_topic("Artificial Intelligence should be regulated"),
            TopicKind::ArtificialIntelligence
        );
        assert_eq!(classify_topic("AI in schools"), TopicKind::ArtificialIntelligence);
        assert_eq!(classify_topic("Remote work is the future"), TopicKind::RemoteWork);
        assert_eq!(classify_topic("Universal basic income"), TopicKind::Generic);
    }

    #[test]
    fn test_ai_keyword_is_a_substring_match() {
        // "trains" contains "ai"
        assert_eq!(classify_topic("Trains beat planes"), TopicKind::ArtificialIntelligence);
    }

    #[test]
    fn test_ai_topic_for_stance_is_verbatim() {
        let mut rng = StdRng::seed_from_u64(1);
        let topic = "Artificial intelligence should be heavily regulated by government";
        for _ in 0..10 {
            assert_eq!(select_rebuttal(topic, Stance::For, &mut rng), AI_AGAINST);
        }
        assert_eq!(select_rebuttal(topic, Stance::Against, &mut rng), AI_FOR);
    }

    #[test]
    fn test_remote_work_paragraphs() {
        let mut rng = StdRng::seed_from_u64(7);
        let topic = "Remote work should be the default";
        assert_eq!(select_rebuttal(topic, Stance::For, &mut rng), REMOTE_WORK_AGAINST);
        assert_eq!(select_rebuttal(topic, Stance::Against, &mut rng), REMOTE_WORK_FOR);
    }

    #[test]
    fn test_generic_rebuttal_interpolates_topic_and_side() {
        let topic = "Universal basic income should be implemented globally";
        for index in 0..GENERIC_TEMPLATE_COUNT {
            let text = generic_rebuttal(index, topic, Stance::Against);
            assert!(text.contains(topic));
            assert!(text.contains("against"));
        }
        assert_eq!(
            generic_rebuttal(3, topic, Stance::For),
            generic_rebuttal(0, topic, Stance::For)
        );
    }

    #[test]
    fn test_generic_selection_is_seed_deterministic() {
        let topic = "Private healthcare systems are better than public ones";
        let mut a = CannedRebuttals::seeded(42);
        let mut b = CannedRebuttals::seeded(42);
        for _ in 0..8 {
            assert_eq!(
                a.rebuttal(topic, Stance::For).unwrap(),
                b.rebuttal(topic, Stance::For).unwrap()
            );
        }
    }

    #[test]
    fn test_injected_rng_matches_seeded_source() {
        let topic = "Space exploration is worth the cost";
        let mut seeded = CannedRebuttals::seeded(9);
        let mut injected = CannedRebuttals::with_rng(StdRng::seed_from_u64(9));
        for _ in 0..8 {
            assert_eq!(
                seeded.rebuttal(topic, Stance::Against).unwrap(),
                injected.rebuttal(topic, Stance::Against).unwrap()
            );
        }
    }

    #[test]
    fn test_generic_selection_covers_all_templates() {
        let topic = "Cryptocurrencies should replace traditional banking systems";
        let mut source = CannedRebuttals::seeded(3);
        let expected: Vec<String> = (0..GENERIC_TEMPLATE_COUNT)
            .map(|i| generic_rebuttal(i, topic, Stance::For))
            .collect();

        let mut seen = [false; GENERIC_TEMPLATE_COUNT];
        for _ in 0..200 {
            let text = source.rebuttal(topic, Stance::Against).unwrap();
            let index = expected.iter().position(|e| *e == text).expect("unknown template");
            seen[index] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
