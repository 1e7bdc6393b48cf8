//! Driver records and document number formatting.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{CachedLabel, RecordId, Vehicle};

/// Employment or trip status of a driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverStatus {
    /// Free to take a vehicle.
    #[default]
    #[serde(rename = "Disponível")]
    Available,
    /// Currently driving.
    #[serde(rename = "Em viagem")]
    OnTrip,
    /// Employed and active.
    #[serde(rename = "Ativo")]
    Active,
    /// No longer active.
    #[serde(rename = "Inativo")]
    Inactive,
}

impl DriverStatus {
    /// The status a driver moves to when their trip flag is toggled.
    #[must_use]
    pub fn toggled_trip(self) -> Self {
        match self {
            Self::OnTrip => Self::Available,
            _ => Self::OnTrip,
        }
    }
}

impl std::fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Disponível"),
            Self::OnTrip => write!(f, "Em viagem"),
            Self::Active => write!(f, "Ativo"),
            Self::Inactive => write!(f, "Inativo"),
        }
    }
}

/// A driver, stored in the `drivers` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Stable identity.
    pub id: RecordId,

    /// Full name, also used as the driver's display value.
    pub nome: String,

    /// CPF document number.
    #[serde(default)]
    pub cpf: String,

    /// Phone number.
    #[serde(default)]
    pub telefone: String,

    /// Contact e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,

    /// Driving license number.
    #[serde(default)]
    pub cnh: String,

    /// Driving license category.
    #[serde(default)]
    pub categoria_cnh: String,

    /// Driving license expiry date.
    #[serde(default)]
    pub vencimento_cnh: String,

    /// Hiring date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_admissao: Option<String>,

    /// Salary as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salario: Option<String>,

    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,

    /// Current status.
    #[serde(default)]
    pub status: DriverStatus,

    /// Back-reference to the vehicle this driver currently holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veiculo_atual_id: Option<RecordId>,

    /// Plate of that vehicle as it was when the assignment was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veiculo_atual: Option<CachedLabel>,
}

impl Driver {
    /// Check whether this driver is linked to the given vehicle.
    #[must_use]
    pub fn holds(&self, vehicle_id: &RecordId) -> bool {
        self.veiculo_atual_id.as_ref() == Some(vehicle_id)
    }

    /// Link this driver to a vehicle, snapshotting the vehicle's plate.
    pub fn link_vehicle(&mut self, vehicle: &Vehicle) {
        self.veiculo_atual_id = Some(vehicle.id.clone());
        self.veiculo_atual = Some(CachedLabel::snapshot(&vehicle.plate));
    }

    /// Drop the vehicle link and its cached label.
    ///
    /// Returns the identity of the vehicle that was linked, if any.
    pub fn clear_vehicle(&mut self) -> Option<RecordId> {
        self.veiculo_atual = None;
        self.veiculo_atual_id.take()
    }
}

/// Form input for a new driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NewDriver {
    pub nome: String,
    pub cpf: String,
    pub telefone: String,
    pub email: Option<String>,
    pub endereco: Option<String>,
    pub cnh: String,
    pub categoria_cnh: String,
    pub vencimento_cnh: String,
    pub data_admissao: Option<String>,
    pub salario: Option<String>,
    pub observacoes: Option<String>,
    pub status: DriverStatus,
}

impl NewDriver {
    /// Build the stored record under the given identity.
    ///
    /// CPF and phone are normalised with [`format_cpf`] and [`format_phone`].
    #[must_use]
    pub fn into_driver(self, id: RecordId) -> Driver {
        Driver {
            id,
            nome: self.nome,
            cpf: format_cpf(&self.cpf),
            telefone: format_phone(&self.telefone),
            email: self.email.filter(|s| !s.is_empty()),
            endereco: self.endereco.filter(|s| !s.is_empty()),
            cnh: self.cnh,
            categoria_cnh: self.categoria_cnh,
            vencimento_cnh: self.vencimento_cnh,
            data_admissao: self.data_admissao.filter(|s| !s.is_empty()),
            salario: self.salario.filter(|s| !s.is_empty()),
            observacoes: self.observacoes.filter(|s| !s.is_empty()),
            status: self.status,
            veiculo_atual_id: None,
            veiculo_atual: None,
        }
    }
}

const DOCUMENT_DIGITS: usize = 11;

fn cpf_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{3})(\d{3})(\d{3})(\d{2})").expect("valid CPF regex"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{2})(\d{5})(\d{4})").expect("valid phone regex"))
}

fn digits_of(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Format a CPF as `XXX.XXX.XXX-XX`.
///
/// Non-digits are stripped first. Input with more than 11 digits is returned
/// unchanged; shorter input comes back as bare digits.
#[must_use]
pub fn format_cpf(value: &str) -> String {
    let digits = digits_of(value);
    if digits.len() > DOCUMENT_DIGITS {
        return value.to_string();
    }
    cpf_pattern().replace(&digits, "$1.$2.$3-$4").into_owned()
}

/// Format a mobile phone number as `(XX) XXXXX-XXXX`.
///
/// Same stripping and length rules as [`format_cpf`].
#[must_use]
pub fn format_phone(value: &str) -> String {
    let digits = digits_of(value);
    if digits.len() > DOCUMENT_DIGITS {
        return value.to_string();
    }
    phone_pattern().replace(&digits, "($1) $2-$3").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
        assert_eq!(format_cpf("123.456.789-01"), "123.456.789-01");
    }

    #[test]
    fn test_format_cpf_short_input_keeps_digits() {
        assert_eq!(format_cpf("123.45"), "12345");
    }

    #[test]
    fn test_format_cpf_long_input_unchanged() {
        assert_eq!(format_cpf("123456789012"), "123456789012");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 98765-4321");
    }

    #[test]
    fn test_trip_toggle() {
        assert_eq!(DriverStatus::OnTrip.toggled_trip(), DriverStatus::Available);
        assert_eq!(DriverStatus::Available.toggled_trip(), DriverStatus::OnTrip);
        assert_eq!(DriverStatus::Inactive.toggled_trip(), DriverStatus::OnTrip);
    }

    #[test]
    fn test_into_driver_formats_documents() {
        let driver = NewDriver {
            nome: "Ana".to_string(),
            cpf: "12345678901".to_string(),
            telefone: "11987654321".to_string(),
            email: Some(String::new()),
            ..NewDriver::default()
        }
        .into_driver(RecordId::new("d1"));

        assert_eq!(driver.cpf, "123.456.789-01");
        assert_eq!(driver.telefone, "(11) 98765-4321");
        assert!(driver.email.is_none());
        assert!(driver.veiculo_atual_id.is_none());
    }

    #[test]
    fn test_wire_field_names() {
        let json = r#"{"id":"d1","nome":"Ana","status":"Ativo",
            "veiculo_atual_id":"v1","veiculo_atual":"ABC1"}"#;
        let driver: Driver = serde_json::from_str(json).unwrap();
        assert_eq!(driver.status, DriverStatus::Active);
        assert!(driver.holds(&RecordId::new("v1")));

        let out = serde_json::to_string(&driver).unwrap();
        assert!(out.contains(r#""veiculo_atual":"ABC1""#));
        assert!(!out.contains("email"));
    }
}
