//! Built-in exercise catalog
//!
//! Fixed reference data: the seeded catalog the suggestion picker draws
//! from. Seeding runs exactly once per store, gated by a persisted meta
//! flag checked at startup, and inserts the whole catalog in one
//! transaction.

use crate::models::{Exercise, ExerciseKind};
use crate::schema::Table;
use crate::store::{self, Store, StoreError};

/// Muscle groups of the built-in catalog, in display order.
pub const MUSCLE_GROUPS: [&str; 8] = [
  "Peito",
  "Bíceps",
  "Tríceps",
  "Ombro",
  "Costas",
  "Perna completa",
  "Abdominal",
  "Cardio",
];

/// Meta flag marking the catalog as seeded.
const SEED_FLAG: &str = "seed_v1";

fn ex(
  name: &str,
  group: &str,
  kind: ExerciseKind,
  primary: &str,
  emphasis: &str,
  secondary: &str,
) -> Exercise {
  Exercise {
    id: None,
    name: name.to_string(),
    group: group.to_string(),
    kind,
    primary: primary.to_string(),
    emphasis: emphasis.to_string(),
    secondary: secondary.to_string(),
    built_in: true,
  }
}

fn builtin_catalog() -> Vec<Exercise> {
  use ExerciseKind::{Cardio, Strength};

  vec![
    // Peito
    ex("Supino reto", "Peito", Strength, "Peitoral maior", "Ênfase na porção esternal (peito médio)", "Tríceps; deltoide anterior"),
    ex("Supino inclinado", "Peito", Strength, "Peitoral maior", "Ênfase na porção clavicular (peito superior)", "Deltoide anterior; tríceps"),
    ex("Crucifixo com halteres", "Peito", Strength, "Peitoral maior", "Ênfase em alongamento e adução horizontal", "Deltoide anterior (leve)"),
    ex("Peck deck", "Peito", Strength, "Peitoral maior", "Ênfase em contração do peitoral", "Deltoide anterior (leve)"),
    ex("Flexão", "Peito", Strength, "Peitoral maior", "Ênfase geral (varia com inclinação e mãos)", "Tríceps; core; deltoide anterior"),
    // Bíceps
    ex("Rosca direta", "Bíceps", Strength, "Bíceps braquial", "Ênfase em volume geral do bíceps", "Braquial; braquiorradial"),
    ex("Rosca alternada", "Bíceps", Strength, "Bíceps braquial", "Ênfase em controle unilateral e amplitude", "Braquial; braquiorradial"),
    ex("Rosca martelo", "Bíceps", Strength, "Braquial / Braquiorradial", "Ênfase em espessura do braço e antebraço", "Bíceps (secundário)"),
    ex("Rosca concentrada", "Bíceps", Strength, "Bíceps braquial", "Ênfase em pico/contração (isolamento)", "Braquial (leve)"),
    ex("Barra fixa supinada", "Bíceps", Strength, "Dorsais + Bíceps", "Ênfase maior no bíceps (pegada supinada)", "Antebraço; dorsal"),
    // Tríceps
    ex("Tríceps pulley", "Tríceps", Strength, "Tríceps braquial", "Ênfase geral (cabeça lateral/medial)", "Antebraço (estabilização)"),
    ex("Tríceps testa", "Tríceps", Strength, "Tríceps braquial", "Ênfase na cabeça longa (maior alongamento)", "Deltoide (estabilização)"),
    ex("Tríceps banco", "Tríceps", Strength, "Tríceps braquial", "Ênfase geral (varia com postura)", "Peitoral; deltoide anterior (leve)"),
    ex("Tríceps corda", "Tríceps", Strength, "Tríceps braquial", "Ênfase em contração final", "Antebraço"),
    ex("Mergulho em paralelas", "Tríceps", Strength, "Tríceps braquial", "Ênfase tríceps + peitoral (inclinação muda)", "Peitoral; ombro"),
    // Ombro
    ex("Desenvolvimento (halteres)", "Ombro", Strength, "Deltoide", "Ênfase deltoide anterior/medial (press)", "Tríceps; trapézio sup."),
    ex("Elevação lateral", "Ombro", Strength, "Deltoide medial", "Ênfase na largura do ombro", "Trapézio (se roubar)"),
    ex("Elevação frontal", "Ombro", Strength, "Deltoide anterior", "Ênfase porção anterior", "Peitoral sup. (leve)"),
    ex("Remada alta", "Ombro", Strength, "Deltoide medial", "Ênfase deltoide medial + trapézio", "Trapézio; bíceps (leve)"),
    ex("Arnold press", "Ombro", Strength, "Deltoide", "Ênfase anterior com rotação", "Tríceps; peitoral (leve)"),
    // Costas
    ex("Puxada frontal", "Costas", Strength, "Dorsal (latíssimo)", "Ênfase dorsais (pegada/ângulo muda)", "Bíceps; romboides"),
    ex("Remada curvada", "Costas", Strength, "Dorsais / Romboides", "Ênfase espessura (meio das costas)", "Lombar; bíceps"),
    ex("Remada baixa", "Costas", Strength, "Romboides / Dorsais", "Ênfase retração escapular", "Bíceps; deltoide post."),
    ex("Barra fixa (pronada)", "Costas", Strength, "Dorsais", "Ênfase dorsais e parte sup.", "Bíceps; antebraço"),
    ex("Pullover (cabo/halter)", "Costas", Strength, "Dorsais", "Ênfase extensão do ombro + alongamento", "Peitoral (leve); tríceps"),
    // Perna completa
    ex("Agachamento", "Perna completa", Strength, "Quadríceps / Glúteos", "Ênfase geral (profundidade muda foco)", "Posterior; core"),
    ex("Leg press", "Perna completa", Strength, "Quadríceps / Glúteos", "Ênfase quadríceps (pés baixos) ou glúteos (pés altos)", "Posterior (leve)"),
    ex("Cadeira extensora", "Perna completa", Strength, "Quadríceps", "Ênfase isolamento quadríceps", "—"),
    ex("Mesa flexora", "Perna completa", Strength, "Posterior de coxa", "Ênfase isquiotibiais (flexão joelho)", "Glúteos (leve)"),
    ex("Panturrilha em pé", "Perna completa", Strength, "Gastrocnêmio", "Ênfase panturrilha com joelho estendido", "Sóleo (sec.)"),
    // Abdominal
    ex("Crunch", "Abdominal", Strength, "Reto abdominal", "Ênfase flexão do tronco (porção superior)", "—"),
    ex("Elevação de pernas", "Abdominal", Strength, "Reto abdominal (infra)", "Ênfase controle pélvico e região inferior", "Flexores do quadril (sec.)"),
    ex("Prancha", "Abdominal", Strength, "Core", "Ênfase estabilização isométrica", "Glúteos; lombar; ombros"),
    ex("Abdominal infra", "Abdominal", Strength, "Reto abdominal (infra)", "Ênfase região inferior (boa retroversão)", "Flexores do quadril"),
    ex("Oblíquo", "Abdominal", Strength, "Oblíquos", "Ênfase rotação/anti-rotação", "Reto abdominal"),
    // Cardio
    ex("Esteira", "Cardio", Cardio, "Cardiorrespiratório", "Ênfase corrida/caminhada (cadência/impacto)", "Pernas (geral)"),
    ex("Bicicleta", "Cardio", Cardio, "Cardiorrespiratório", "Ênfase baixo impacto (cadência/força)", "Quadríceps; glúteos"),
    ex("Elíptico", "Cardio", Cardio, "Cardiorrespiratório", "Ênfase baixo impacto + corpo inteiro", "Pernas; braços (leve)"),
    ex("Corrida externa", "Cardio", Cardio, "Cardiorrespiratório", "Ênfase variação de terreno", "Pernas; core"),
    ex("Escada", "Cardio", Cardio, "Cardiorrespiratório", "Ênfase condicionamento + pernas", "Quadríceps; glúteos; panturrilha"),
  ]
}

/// Insert the built-in catalog exactly once. Safe to call on every
/// startup: a persisted flag marks completion.
pub async fn ensure_seed(store: &Store) -> Result<(), StoreError> {
  if store.meta_get(SEED_FLAG).await?.as_deref() == Some("1") {
    return Ok(());
  }

  let catalog = builtin_catalog();
  let mut tx = store.begin().await?;

  for exercise in &catalog {
    store::add_in(&mut *tx, Table::Exercises, &serde_json::to_value(exercise)?).await?;
  }
  store::meta_set_in(&mut *tx, SEED_FLAG, "1").await?;

  tx.commit().await?;
  tracing::info!(count = catalog.len(), "built-in exercise catalog seeded");
  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::setup_test_store;
  use std::collections::BTreeSet;

  #[tokio::test]
  async fn test_seed_populates_catalog() {
    let store = setup_test_store().await;
    ensure_seed(&store).await.expect("seed failed");

    let exercises = store.get_all(Table::Exercises).await.expect("get_all failed");
    assert_eq!(exercises.len(), 40);

    let groups: BTreeSet<&str> =
      exercises.iter().filter_map(|e| e["group"].as_str()).collect();
    for group in MUSCLE_GROUPS {
      assert!(groups.contains(group), "no seed rows for {}", group);
    }

    // Cardio rows are the only cardio-kind entries.
    for e in &exercises {
      let expect_cardio = e["group"] == "Cardio";
      assert_eq!(e["kind"] == "cardio", expect_cardio, "bad kind on {}", e["name"]);
    }
  }

  #[tokio::test]
  async fn test_seed_runs_exactly_once() {
    let store = setup_test_store().await;

    ensure_seed(&store).await.expect("first seed failed");
    ensure_seed(&store).await.expect("second seed failed");

    let exercises = store.get_all(Table::Exercises).await.expect("get_all failed");
    assert_eq!(exercises.len(), 40);
    assert_eq!(
      store.meta_get("seed_v1").await.expect("meta_get failed").as_deref(),
      Some("1")
    );
  }
}
