//! Fixed-taxonomy topic extraction: ~20 named topics with keyword lists,
//! confidence blended from keyword coverage and density, top 5 kept.

use cag_types::Topic;
use chrono::{DateTime, Utc};

const TOP_TOPICS: usize = 5;

struct TopicDef {
    name: &'static str,
    keywords: &'static [&'static str],
}

const TAXONOMY: &[TopicDef] = &[
    TopicDef { name: "tecnologia", keywords: &["tecnologia", "software", "hardware", "internet", "dispositivo", "app", "aplicacion", "dato", "nube"] },
    TopicDef { name: "programacion", keywords: &["codigo", "programar", "funcion", "variable", "rust", "python", "javascript", "compilar", "bug", "framework"] },
    TopicDef { name: "inteligencia_artificial", keywords: &["ia", "inteligencia artificial", "modelo", "machine learning", "red neuronal", "gpt", "llm", "entrenamiento"] },
    TopicDef { name: "ciencia", keywords: &["ciencia", "experimento", "hipotesis", "investigacion", "laboratorio", "fisica", "quimica", "biologia"] },
    TopicDef { name: "matematicas", keywords: &["matematicas", "ecuacion", "algebra", "geometria", "calculo", "numero", "estadistica", "probabilidad"] },
    TopicDef { name: "salud", keywords: &["salud", "medico", "enfermedad", "sintoma", "tratamiento", "hospital", "medicina", "doctor"] },
    TopicDef { name: "nutricion", keywords: &["nutricion", "dieta", "alimento", "comida", "vitamina", "proteina", "caloria", "nutriente"] },
    TopicDef { name: "historia", keywords: &["historia", "guerra", "siglo", "imperio", "civilizacion", "historico", "revolucion"] },
    TopicDef { name: "literatura", keywords: &["literatura", "novela", "poema", "libro", "autor", "escritor", "narrativa"] },
    TopicDef { name: "arte", keywords: &["arte", "pintura", "escultura", "museo", "artista", "exposicion", "dibujo"] },
    TopicDef { name: "musica", keywords: &["musica", "cancion", "album", "concierto", "instrumento", "banda", "melodia"] },
    TopicDef { name: "negocios", keywords: &["negocio", "empresa", "startup", "estrategia", "mercado", "cliente", "venta"] },
    TopicDef { name: "economia", keywords: &["economia", "inflacion", "mercado", "finanzas", "inversion", "bolsa", "presupuesto"] },
    TopicDef { name: "viajes", keywords: &["viaje", "vuelo", "hotel", "turismo", "destino", "pasaporte", "maleta"] },
    TopicDef { name: "deportes", keywords: &["deporte", "futbol", "partido", "equipo", "entrenamiento", "atleta", "torneo"] },
    TopicDef { name: "educacion", keywords: &["educacion", "escuela", "universidad", "estudiante", "profesor", "clase", "examen"] },
    TopicDef { name: "politica", keywords: &["politica", "gobierno", "eleccion", "ley", "congreso", "presidente", "partido politico"] },
    TopicDef { name: "medio_ambiente", keywords: &["ambiente", "clima", "contaminacion", "sostenible", "ecologia", "reciclaje", "energia renovable"] },
    TopicDef { name: "psicologia", keywords: &["psicologia", "emocion", "terapia", "mente", "conducta", "ansiedad", "bienestar"] },
];

fn normalize(text: &str) -> String {
    text.to_lowercase()
}

/// Scores every taxonomy topic against `text`, keeping the top 5 by
/// confidence. Confidence = `min(0.9, 0.5 + matched/total * 0.5) * (0.7 +
/// 0.3 * density)`, where density is matched keywords per 20 words.
pub fn extract(text: &str, now: DateTime<Utc>) -> Vec<Topic> {
    let normalized = normalize(text);
    let word_count = normalized.split_whitespace().count().max(1) as f32;

    let mut scored: Vec<Topic> = TAXONOMY
        .iter()
        .filter_map(|def| {
            let matched = def.keywords.iter().filter(|k| normalized.contains(*k)).count();
            if matched == 0 {
                return None;
            }
            let coverage = matched as f32 / def.keywords.len() as f32;
            let density = (matched as f32 / (word_count / 20.0).max(1.0)).min(1.0);
            let confidence = (0.5 + coverage * 0.5).min(0.9) * (0.7 + 0.3 * density);
            Some(Topic::new(def.name, confidence, now))
        })
        .collect();

    scored.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(TOP_TOPICS);
    scored
}
