// ==========================================
// App Granja - Domain type definitions
// ==========================================
// Storage format: SCREAMING_SNAKE_CASE strings (same as the database)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Tracking type (tipo de seguimiento)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingType {
    Produccion, // egg production only
    Engorde,    // growth only
    Mixto,      // both
}

impl TrackingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingType::Produccion => "PRODUCCION",
            TrackingType::Engorde => "ENGORDE",
            TrackingType::Mixto => "MIXTO",
        }
    }

    /// Growth details are only valid on ENGORDE / MIXTO records
    pub fn admits_growth_detail(&self) -> bool {
        matches!(self, TrackingType::Engorde | TrackingType::Mixto)
    }
}

impl fmt::Display for TrackingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrackingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PRODUCCION" => Ok(TrackingType::Produccion),
            "ENGORDE" => Ok(TrackingType::Engorde),
            "MIXTO" => Ok(TrackingType::Mixto),
            other => Err(format!("tipo de seguimiento desconocido: {}", other)),
        }
    }
}

// ==========================================
// Batch state (estado del lote)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    Inicial,
    Crecimiento,
    Produccion,
    Finalizacion,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Inicial => "INICIAL",
            BatchState::Crecimiento => "CRECIMIENTO",
            BatchState::Produccion => "PRODUCCION",
            BatchState::Finalizacion => "FINALIZACION",
        }
    }

    /// Counted as an active batch of its shed
    pub fn is_active(&self) -> bool {
        !matches!(self, BatchState::Finalizacion)
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BatchState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INICIAL" => Ok(BatchState::Inicial),
            "CRECIMIENTO" => Ok(BatchState::Crecimiento),
            "PRODUCCION" => Ok(BatchState::Produccion),
            "FINALIZACION" => Ok(BatchState::Finalizacion),
            other => Err(format!("estado de lote desconocido: {}", other)),
        }
    }
}

// ==========================================
// Farm state
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FarmState {
    Activa,
    Inactiva,
    Mantenimiento,
}

impl FarmState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FarmState::Activa => "ACTIVA",
            FarmState::Inactiva => "INACTIVA",
            FarmState::Mantenimiento => "MANTENIMIENTO",
        }
    }
}

impl fmt::Display for FarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FarmState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVA" => Ok(FarmState::Activa),
            "INACTIVA" => Ok(FarmState::Inactiva),
            "MANTENIMIENTO" => Ok(FarmState::Mantenimiento),
            other => Err(format!("estado de granja desconocido: {}", other)),
        }
    }
}

// ==========================================
// Shed type (tipo de galpón)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShedType {
    Cria,        // broiler rearing
    Recria,      // broiler re-rearing
    Postura,     // laying
    Reproductor, // breeders
    Cuarentena,  // quarantine
}

impl ShedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShedType::Cria => "CRIA",
            ShedType::Recria => "RECRIA",
            ShedType::Postura => "POSTURA",
            ShedType::Reproductor => "REPRODUCTOR",
            ShedType::Cuarentena => "CUARENTENA",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ShedType::Cria => "Cría (Engorde)",
            ShedType::Recria => "Recría (Engorde)",
            ShedType::Postura => "Postura (Huevos)",
            ShedType::Reproductor => "Reproductor",
            ShedType::Cuarentena => "Cuarentena",
        }
    }
}

impl fmt::Display for ShedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CRIA" => Ok(ShedType::Cria),
            "RECRIA" => Ok(ShedType::Recria),
            "POSTURA" => Ok(ShedType::Postura),
            "REPRODUCTOR" => Ok(ShedType::Reproductor),
            "CUARENTENA" => Ok(ShedType::Cuarentena),
            other => Err(format!("tipo de galpón desconocido: {}", other)),
        }
    }
}

// ==========================================
// Feed stage (etapa del alimento)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedStage {
    Iniciador,
    Crecimiento,
    Desarrollo,
    Prepostura,
    #[serde(rename = "POSTURA_FASE1")]
    PosturaFase1,
    #[serde(rename = "POSTURA_FASE2")]
    PosturaFase2,
    EngordeInicial,
    EngordeCrecimiento,
    EngordeTerminacion,
}

impl FeedStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedStage::Iniciador => "INICIADOR",
            FeedStage::Crecimiento => "CRECIMIENTO",
            FeedStage::Desarrollo => "DESARROLLO",
            FeedStage::Prepostura => "PREPOSTURA",
            FeedStage::PosturaFase1 => "POSTURA_FASE1",
            FeedStage::PosturaFase2 => "POSTURA_FASE2",
            FeedStage::EngordeInicial => "ENGORDE_INICIAL",
            FeedStage::EngordeCrecimiento => "ENGORDE_CRECIMIENTO",
            FeedStage::EngordeTerminacion => "ENGORDE_TERMINACION",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FeedStage::Iniciador => "Iniciador (0-3 semanas)",
            FeedStage::Crecimiento => "Crecimiento (3-6 semanas)",
            FeedStage::Desarrollo => "Desarrollo (6-12 semanas)",
            FeedStage::Prepostura => "Pre-postura (12-18 semanas)",
            FeedStage::PosturaFase1 => "Postura Fase 1 (18-40 semanas)",
            FeedStage::PosturaFase2 => "Postura Fase 2 (40+ semanas)",
            FeedStage::EngordeInicial => "Engorde Inicial (0-10 días)",
            FeedStage::EngordeCrecimiento => "Engorde Crecimiento (11-22 días)",
            FeedStage::EngordeTerminacion => "Engorde Terminación (22+ días)",
        }
    }
}

impl fmt::Display for FeedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FeedStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INICIADOR" => Ok(FeedStage::Iniciador),
            "CRECIMIENTO" => Ok(FeedStage::Crecimiento),
            "DESARROLLO" => Ok(FeedStage::Desarrollo),
            "PREPOSTURA" => Ok(FeedStage::Prepostura),
            "POSTURA_FASE1" => Ok(FeedStage::PosturaFase1),
            "POSTURA_FASE2" => Ok(FeedStage::PosturaFase2),
            "ENGORDE_INICIAL" => Ok(FeedStage::EngordeInicial),
            "ENGORDE_CRECIMIENTO" => Ok(FeedStage::EngordeCrecimiento),
            "ENGORDE_TERMINACION" => Ok(FeedStage::EngordeTerminacion),
            other => Err(format!("etapa de alimento desconocida: {}", other)),
        }
    }
}

// ==========================================
// Flock uniformity (uniformidad)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Uniformity {
    Excelente,  // > 90%
    Buena,      // 80-90%
    Regular,    // 70-80%
    Deficiente, // < 70%
}

impl Uniformity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Uniformity::Excelente => "EXCELENTE",
            Uniformity::Buena => "BUENA",
            Uniformity::Regular => "REGULAR",
            Uniformity::Deficiente => "DEFICIENTE",
        }
    }

    /// Category for a measured uniformity percentage
    pub fn from_percentage(pct: f64) -> Self {
        if pct > 90.0 {
            Uniformity::Excelente
        } else if pct >= 80.0 {
            Uniformity::Buena
        } else if pct >= 70.0 {
            Uniformity::Regular
        } else {
            Uniformity::Deficiente
        }
    }
}

impl fmt::Display for Uniformity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Uniformity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EXCELENTE" => Ok(Uniformity::Excelente),
            "BUENA" => Ok(Uniformity::Buena),
            "REGULAR" => Ok(Uniformity::Regular),
            "DEFICIENTE" => Ok(Uniformity::Deficiente),
            other => Err(format!("uniformidad desconocida: {}", other)),
        }
    }
}

// ==========================================
// Egg classification (tipo de huevo)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EggClass {
    Aa,
    A,
    B,
    C,
    D,
    Jumbo,
}

impl EggClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EggClass::Aa => "AA",
            EggClass::A => "A",
            EggClass::B => "B",
            EggClass::C => "C",
            EggClass::D => "D",
            EggClass::Jumbo => "JUMBO",
        }
    }

    /// Label with the weight range, as shown on charts
    pub fn display_name(&self) -> &'static str {
        match self {
            EggClass::Aa => "AA (Extra Grande > 69g)",
            EggClass::A => "A (Grande 60-68g)",
            EggClass::B => "B (Mediano 53-59g)",
            EggClass::C => "C (Pequeño 45-52g)",
            EggClass::D => "D (Cartón < 45g)",
            EggClass::Jumbo => "Jumbo (>70g)",
        }
    }
}

impl fmt::Display for EggClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EggClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AA" => Ok(EggClass::Aa),
            "A" => Ok(EggClass::A),
            "B" => Ok(EggClass::B),
            "C" => Ok(EggClass::C),
            "D" => Ok(EggClass::D),
            "JUMBO" => Ok(EggClass::Jumbo),
            other => Err(format!("tipo de huevo desconocido: {}", other)),
        }
    }
}

// ==========================================
// Recommendation tier
// ==========================================
// Order: Positivo < Advertencia < Alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationTier {
    Informacion,
    Positivo,
    Advertencia,
    Alerta,
}

impl fmt::Display for RecommendationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationTier::Informacion => write!(f, "informacion"),
            RecommendationTier::Positivo => write!(f, "positivo"),
            RecommendationTier::Advertencia => write!(f, "advertencia"),
            RecommendationTier::Alerta => write!(f, "alerta"),
        }
    }
}

// ==========================================
// Reporting period
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Dia,
    #[default]
    Semana,
    Mes,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Dia => write!(f, "dia"),
            Period::Semana => write!(f, "semana"),
            Period::Mes => write!(f, "mes"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dia" | "día" | "day" => Ok(Period::Dia),
            "semana" | "week" => Ok(Period::Semana),
            "mes" | "month" => Ok(Period::Mes),
            other => Err(format!("periodo desconocido: {}", other)),
        }
    }
}

// ==========================================
// Query scope: whole farm, one batch or one shed
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "tipo", content = "id", rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Todos,
    Lote(String),
    Galpon(String),
}

impl Scope {
    /// Batch filter wins when both are given
    pub fn from_options(lote_id: Option<&str>, galpon_id: Option<&str>) -> Self {
        match (lote_id, galpon_id) {
            (Some(l), _) if !l.trim().is_empty() => Scope::Lote(l.trim().to_string()),
            (_, Some(g)) if !g.trim().is_empty() => Scope::Galpon(g.trim().to_string()),
            _ => Scope::Todos,
        }
    }
}
