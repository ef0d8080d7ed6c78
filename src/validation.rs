//! Form checks that run before anything is sent.
//!
//! Forms hold raw text as typed; `validate` turns a form into a typed
//! submission or the first problem found.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Address, ListingKind};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const PHONE_DIGITS: usize = 10;

/// A validated listing, ready to be sent as a multipart form.
pub trait Submission: Send + Sync {
    fn kind(&self) -> ListingKind;

    /// Text fields, in send order. Repeated names are allowed.
    fn fields(&self) -> Vec<(&'static str, String)>;

    fn images(&self) -> &[PathBuf];
}

#[derive(Debug, Clone, Default)]
pub struct RoomForm {
    pub title: String,
    pub description: String,
    pub bhk: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price: String,
    pub amenities: Vec<String>,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomSubmission {
    pub title: String,
    pub description: String,
    pub bhk: String,
    pub address: Address,
    pub price: i64,
    pub amenities: Vec<String>,
    pub images: Vec<PathBuf>,
}

impl RoomForm {
    pub fn validate(&self) -> Result<RoomSubmission> {
        let title = required("title", &self.title, "Please enter a title")?;
        let description = required("description", &self.description, "Please add a description")?;
        let bhk = required("bhk", &self.bhk, "Please choose the BHK type")?;
        let address = address(&self.address, &self.city, &self.state)?;
        let price = positive_amount("price", &self.price, "Price")?;
        let images = photos(&self.images)?;

        Ok(RoomSubmission {
            title,
            description,
            bhk,
            address,
            price,
            amenities: clean_amenities(&self.amenities),
            images,
        })
    }
}

impl Submission for RoomSubmission {
    fn kind(&self) -> ListingKind {
        ListingKind::Room
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("bhk", self.bhk.clone()),
            ("price", self.price.to_string()),
        ];
        push_address(&mut fields, &self.address);
        fields.extend(self.amenities.iter().map(|a| ("amenities", a.clone())));
        fields
    }

    fn images(&self) -> &[PathBuf] {
        &self.images
    }
}

#[derive(Debug, Clone, Default)]
pub struct HostelForm {
    pub title: String,
    pub description: String,
    pub hostel_type: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price: String,
    pub total_beds: String,
    pub available_beds: String,
    pub amenities: Vec<String>,
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostelSubmission {
    pub title: String,
    pub description: String,
    pub hostel_type: String,
    pub address: Address,
    pub price: i64,
    pub total_beds: u32,
    pub available_beds: u32,
    pub amenities: Vec<String>,
    pub images: Vec<PathBuf>,
}

impl HostelForm {
    pub fn validate(&self) -> Result<HostelSubmission> {
        let title = required("title", &self.title, "Please enter a title")?;
        let description = required("description", &self.description, "Please add a description")?;
        let hostel_type = required(
            "hostelType",
            &self.hostel_type,
            "Please choose the hostel type",
        )?;
        let address = address(&self.address, &self.city, &self.state)?;
        let price = positive_amount("price", &self.price, "Price")?;
        let total_beds = bed_count("totalBeds", &self.total_beds, "Total beds")?;
        if total_beds == 0 {
            return Err(Error::validation("totalBeds", "Total beds must be at least 1"));
        }
        let available_beds = bed_count("availableBeds", &self.available_beds, "Available beds")?;
        if available_beds > total_beds {
            return Err(Error::validation(
                "availableBeds",
                "Available beds cannot exceed total beds",
            ));
        }
        let images = photos(&self.images)?;

        Ok(HostelSubmission {
            title,
            description,
            hostel_type,
            address,
            price,
            total_beds,
            available_beds,
            amenities: clean_amenities(&self.amenities),
            images,
        })
    }
}

impl Submission for HostelSubmission {
    fn kind(&self) -> ListingKind {
        ListingKind::Hostel
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("hostelType", self.hostel_type.clone()),
            ("price", self.price.to_string()),
            ("totalBeds", self.total_beds.to_string()),
            ("availableBeds", self.available_beds.to_string()),
        ];
        push_address(&mut fields, &self.address);
        fields.extend(self.amenities.iter().map(|a| ("amenities", a.clone())));
        fields
    }

    fn images(&self) -> &[PathBuf] {
        &self.images
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl SignUpForm {
    /// Check the form and return the trimmed copy that gets sent. The
    /// password is left as typed.
    pub fn validate(&self) -> Result<SignUpForm> {
        let name = required("name", &self.name, "Please enter your name")?;
        validate_credentials(&self.email, &self.password)?;
        let phone = match self.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => {
                validate_phone(phone)?;
                Some(phone.to_string())
            }
            _ => None,
        };
        Ok(SignUpForm {
            name,
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LandlordForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl LandlordForm {
    pub fn validate(&self) -> Result<LandlordForm> {
        let name = required("name", &self.name, "Please enter your name")?;
        validate_credentials(&self.email, &self.password)?;
        validate_phone(&self.phone)?;
        Ok(LandlordForm {
            name,
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone: self.phone.trim().to_string(),
        })
    }
}

pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::validation("email", "Please enter a valid email address"))
    }
}

pub fn validate_phone(phone: &str) -> Result<()> {
    let phone = phone.trim();
    if phone.len() == PHONE_DIGITS && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::validation(
            "phone",
            format!("Phone number must be {PHONE_DIGITS} digits"),
        ))
    }
}

fn required(field: &'static str, value: &str, message: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(Error::validation(field, message))
    } else {
        Ok(value.to_string())
    }
}

fn address(street: &str, city: &str, state: &str) -> Result<Address> {
    Ok(Address {
        address: required("address", street, "Please enter the address")?,
        city: required("city", city, "Please enter the city")?,
        state: required("state", state, "Please enter the state")?,
    })
}

fn positive_amount(field: &'static str, raw: &str, label: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation(field, format!("{label} is required")));
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Ok(n.round() as i64),
        _ => Err(Error::validation(
            field,
            format!("{label} must be a positive number"),
        )),
    }
}

fn bed_count(field: &'static str, raw: &str, label: &str) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation(field, format!("{label} is required")));
    }
    raw.parse::<u32>()
        .map_err(|_| Error::validation(field, format!("{label} must be a whole number")))
}

fn photos(images: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if images.is_empty() {
        return Err(Error::validation("images", "Please add at least one photo"));
    }
    Ok(images.to_vec())
}

fn clean_amenities(amenities: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for amenity in amenities.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
        if !cleaned.iter().any(|c| c.eq_ignore_ascii_case(amenity)) {
            cleaned.push(amenity.to_string());
        }
    }
    cleaned
}

fn push_address(fields: &mut Vec<(&'static str, String)>, address: &Address) {
    fields.push(("address", address.address.clone()));
    fields.push(("city", address.city.clone()));
    fields.push(("state", address.state.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_form() -> RoomForm {
        RoomForm {
            title: "Sunny room".into(),
            description: "Near the lake".into(),
            bhk: "1 BHK".into(),
            address: "12 MG Road".into(),
            city: "Bhopal".into(),
            state: "MP".into(),
            price: " 6500 ".into(),
            amenities: vec!["WiFi".into(), " ".into(), "wifi".into(), "Parking".into()],
            images: vec![PathBuf::from("cover.jpg")],
        }
    }

    fn hostel_form() -> HostelForm {
        HostelForm {
            title: "Minal Boys Hostel".into(),
            description: "Mess included".into(),
            hostel_type: "Boys".into(),
            address: "Minal Residency".into(),
            city: "Bhopal".into(),
            state: "MP".into(),
            price: "4000".into(),
            total_beds: "20".into(),
            available_beds: "5".into(),
            amenities: vec![],
            images: vec![PathBuf::from("front.png")],
        }
    }

    fn field_of(err: Error) -> &'static str {
        match err {
            Error::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_room_form_produces_submission() {
        let submission = room_form().validate().unwrap();
        assert_eq!(submission.price, 6500);
        assert_eq!(submission.amenities, vec!["WiFi", "Parking"]);

        let fields = submission.fields();
        assert!(fields.contains(&("city", "Bhopal".to_string())));
        assert_eq!(fields.iter().filter(|(k, _)| *k == "amenities").count(), 2);
        assert_eq!(submission.kind(), ListingKind::Room);
    }

    #[test]
    fn room_price_must_be_positive_number() {
        for bad in ["", "abc", "0", "-100"] {
            let form = RoomForm {
                price: bad.into(),
                ..room_form()
            };
            assert_eq!(field_of(form.validate().unwrap_err()), "price", "{bad:?}");
        }
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        let form = RoomForm {
            title: "  ".into(),
            city: String::new(),
            ..room_form()
        };
        assert_eq!(field_of(form.validate().unwrap_err()), "title");

        let form = RoomForm {
            images: vec![],
            ..room_form()
        };
        assert_eq!(field_of(form.validate().unwrap_err()), "images");
    }

    #[test]
    fn available_beds_cannot_exceed_total() {
        let form = HostelForm {
            available_beds: "21".into(),
            ..hostel_form()
        };
        assert_eq!(field_of(form.validate().unwrap_err()), "availableBeds");

        let full = HostelForm {
            available_beds: "20".into(),
            ..hostel_form()
        };
        assert_eq!(full.validate().unwrap().available_beds, 20);
    }

    #[test]
    fn hostel_needs_at_least_one_bed() {
        let form = HostelForm {
            total_beds: "0".into(),
            available_beds: "0".into(),
            ..hostel_form()
        };
        assert_eq!(field_of(form.validate().unwrap_err()), "totalBeds");

        let form = HostelForm {
            total_beds: "ten".into(),
            ..hostel_form()
        };
        assert_eq!(field_of(form.validate().unwrap_err()), "totalBeds");
    }

    #[test]
    fn hostel_fields_carry_bed_counts() {
        let fields = hostel_form().validate().unwrap().fields();
        assert!(fields.contains(&("totalBeds", "20".to_string())));
        assert!(fields.contains(&("hostelType", "Boys".to_string())));
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("asha@example.com").is_ok());
        assert!(validate_email(" asha@mail.example.in ").is_ok());
        for bad in ["", "asha", "@example.com", "asha@", "asha@example", "a@b@c.com", "asha@.com"] {
            assert!(validate_email(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn sign_up_checks_password_and_optional_phone() {
        let mut form = SignUpForm {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "secret".into(),
            phone: None,
        };
        assert!(form.validate().is_ok());

        form.phone = Some("98765".into());
        assert_eq!(field_of(form.validate().unwrap_err()), "phone");

        form.phone = Some("9876543210".into());
        form.password = "short".into();
        assert_eq!(field_of(form.validate().unwrap_err()), "password");
    }

    #[test]
    fn landlord_phone_is_required() {
        let form = LandlordForm {
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            password: "secret1".into(),
            phone: String::new(),
        };
        assert_eq!(field_of(form.validate().unwrap_err()), "phone");
    }

    #[test]
    fn account_forms_are_sent_trimmed() {
        let sign_up = SignUpForm {
            name: "  Asha ".into(),
            email: " asha@example.com ".into(),
            password: " pass word ".into(),
            phone: Some("   ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(sign_up.name, "Asha");
        assert_eq!(sign_up.email, "asha@example.com");
        assert_eq!(sign_up.password, " pass word ");
        assert_eq!(sign_up.phone, None);

        let landlord = LandlordForm {
            name: "Ravi\t".into(),
            email: "ravi@example.com  ".into(),
            password: "secret1".into(),
            phone: " 9876543210 ".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(landlord.name, "Ravi");
        assert_eq!(landlord.email, "ravi@example.com");
        assert_eq!(landlord.phone, "9876543210");
    }
}
