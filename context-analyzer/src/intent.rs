//! Intent classification: weighted keyword/phrase pattern match, ties
//! broken in favor of whichever intent's match starts earliest.

use cag_types::{Intent, IntentName};

const TIE_EPSILON: f32 = 1e-6;
const TIE_BREAK_BONUS: f32 = 0.1;

struct IntentDef {
    name: IntentName,
    patterns: &'static [(&'static str, f32)],
}

const INTENTS: &[IntentDef] = &[
    IntentDef { name: IntentName::Saludar, patterns: &[("hola", 1.0), ("buenas", 0.8), ("hey", 0.7), ("que tal", 0.7)] },
    IntentDef { name: IntentName::Agradecer, patterns: &[("gracias", 1.0), ("agradezco", 0.9), ("te lo agradezco", 1.0)] },
    IntentDef { name: IntentName::Despedirse, patterns: &[("adios", 1.0), ("hasta luego", 0.9), ("nos vemos", 0.8), ("chau", 0.8)] },
    IntentDef { name: IntentName::Confirmar, patterns: &[("si", 0.6), ("claro", 0.9), ("de acuerdo", 0.9), ("exacto", 0.8)] },
    IntentDef { name: IntentName::Negar, patterns: &[("no", 0.5), ("para nada", 0.9), ("en absoluto", 0.9)] },
    IntentDef { name: IntentName::Aclarar, patterns: &[("a que te refieres", 1.0), ("puedes aclarar", 1.0), ("no entiendo", 0.8)] },
    IntentDef { name: IntentName::SolicitarOpinion, patterns: &[("que opinas", 1.0), ("que piensas", 1.0), ("crees que", 0.8)] },
    IntentDef { name: IntentName::AccionComando, patterns: &[("haz", 0.9), ("genera", 0.9), ("crea", 0.8), ("ejecuta", 0.9), ("calcula", 0.8)] },
    IntentDef { name: IntentName::GenerarContenido, patterns: &[("escribe", 0.9), ("redacta", 0.9), ("genera un texto", 1.0), ("crea un resumen", 1.0)] },
    IntentDef { name: IntentName::BuscarInformacion, patterns: &[("que es", 0.9), ("quien es", 0.9), ("cuando", 0.6), ("donde", 0.6), ("busca", 0.8)] },
];

fn earliest_match(text: &str, patterns: &[(&str, f32)]) -> Option<(f32, usize)> {
    let mut total = 0.0;
    let mut earliest = None;
    for (pattern, weight) in patterns {
        if let Some(pos) = text.find(pattern) {
            total += weight;
            earliest = Some(earliest.map_or(pos, |e: usize| e.min(pos)));
        }
    }
    earliest.map(|pos| (total, pos))
}

/// Classifies the message's intent via weighted pattern match, defaulting
/// to `Conversar` when nothing matches.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();

    let scored: Vec<(IntentName, f32, usize)> = INTENTS
        .iter()
        .filter_map(|def| earliest_match(&lower, def.patterns).map(|(score, pos)| (def.name, score, pos)))
        .collect();

    let Some(&(_, top_score, _)) = scored.iter().max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)) else {
        return Intent { name: IntentName::Conversar, confidence: 0.5 };
    };

    let mut tied: Vec<&(IntentName, f32, usize)> = scored.iter().filter(|(_, score, _)| (score - top_score).abs() < TIE_EPSILON).collect();
    tied.sort_by_key(|(_, _, pos)| *pos);

    let (name, score, _) = tied[0];
    let confidence = (score + if tied.len() > 1 { TIE_BREAK_BONUS } else { 0.0 }).min(1.0);
    Intent { name, confidence }
}
