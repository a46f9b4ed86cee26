use serde::Serialize;
use std::collections::BTreeMap;

/// Resultado final de una petición: severidad por ubicación corporal y su suma.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PostureReport {
    pub scores: BTreeMap<String, u32>,
    pub total: u32,
}

/// Suma las severidades por ubicación. La no negatividad la garantiza el
/// contrato de salida del clasificador (u32).
pub fn aggregate(scores: BTreeMap<String, u32>) -> PostureReport {
    let total = scores.values().sum();
    PostureReport { scores, total }
}
