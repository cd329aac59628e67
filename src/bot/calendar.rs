//! Date-derived reply texts.

use chrono::{Duration, NaiveDate};

/// Reply when the visitor's date cannot be parsed.
pub const DATE_FORMAT_ERROR: &str = "La date n'est pas valide. Utilise le format JJ/MM/AAAA.";

/// Human pregnancy length used to back-compute the conception date.
const PREGNANCY_DAYS: i64 = 280;

/// Expanded programme on immunization of the Burkinabè health ministry:
/// vaccine name and age in months.
const VACCINATION_SCHEDULE: &[(&str, i64)] = &[
    ("BCG", 0),
    ("Hépatite B", 0),
    ("VPO", 0),
    ("DTC-HepB-Hib 1", 2),
    ("VPO 1", 2),
    ("Pneumo 1 PCV13", 2),
    ("Rota 1", 2),
    ("DTC-HepB-Hib 2", 3),
    ("VPO 2", 3),
    ("Rota 2", 3),
    ("DTC-HepB-Hib 3", 4),
    ("VPO 3", 4),
    ("Pneumo 2", 4),
    ("Rota 3", 4),
    ("VPI", 4),
    ("Vaccin antipaludique 1", 5),
    ("Vaccin antipaludique 2", 6),
    ("Vaccin antipaludique 3", 7),
    ("RR 1", 9),
    ("VAA", 9),
    ("VTC fièvre typhoïde", 9),
    ("VPI 2", 9),
    ("RR 2", 15),
    ("Men A MenAfriVac", 15),
    ("Pneumo 3 PCV13", 23),
    ("Vaccin antipaludique 4", 23),
];

/// Parse a `JJ/MM/AAAA` date.
#[must_use]
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%d/%m/%Y").ok()
}

/// Pregnancy calendar for an expected delivery date.
///
/// `today` is injected so the week arithmetic is testable.
#[must_use]
pub fn pregnancy_calendar(input: &str, today: NaiveDate) -> String {
    let Some(due) = parse_date(input) else {
        return DATE_FORMAT_ERROR.to_string();
    };

    let conception = due - Duration::days(PREGNANCY_DAYS);
    let weeks_pregnant = (today - conception).num_days() / 7;
    let weeks_remaining = (due - today).num_days() / 7;

    format!(
        "Calendrier de votre grossesse :\n\
         Date prévue d'accouchement : {due}\n\
         Date probable de conception : {conception}\n\
         Âge actuel de grossesse : {weeks_pregnant} semaines\n\
         Semaines restantes : {weeks_remaining} semaines\n\
         Souhaitez-vous un calendrier détaillé mois par mois ?",
        due = due.format("%d/%m/%Y"),
        conception = conception.format("%d/%m/%Y"),
    )
}

/// Vaccination calendar for a child's birth date.
#[must_use]
pub fn vaccination_calendar(input: &str) -> String {
    let Some(birth) = parse_date(input) else {
        return DATE_FORMAT_ERROR.to_string();
    };

    let mut reply = String::from("Calendrier de vaccination pour votre enfant :\n");
    for (vaccine, months) in VACCINATION_SCHEDULE {
        let date = birth + Duration::days(months * 30);
        reply.push_str(&format!("• {vaccine} : {}\n", date.format("%d/%m/%Y")));
    }
    reply
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32, m: u32, y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_day_month_year() {
        assert_eq!(parse_date("15/09/2026"), Some(date(15, 9, 2026)));
        assert_eq!(parse_date(" 01/01/2026 "), Some(date(1, 1, 2026)));
        assert_eq!(parse_date("2026-09-15"), None);
        assert_eq!(parse_date("31/02/2026"), None);
    }

    #[test]
    fn pregnancy_calendar_computes_weeks() {
        let today = date(1, 3, 2026);
        let reply = pregnancy_calendar("15/09/2026", today);
        assert!(reply.contains("Date prévue d'accouchement : 15/09/2026"));
        // Conception = due - 280 days.
        assert!(reply.contains("Date probable de conception : 09/12/2025"));
        // (01/03/2026 - 09/12/2025) = 82 days -> 11 weeks.
        assert!(reply.contains("Âge actuel de grossesse : 11 semaines"));
        // (15/09/2026 - 01/03/2026) = 198 days -> 28 weeks.
        assert!(reply.contains("Semaines restantes : 28 semaines"));
    }

    #[test]
    fn pregnancy_calendar_rejects_bad_dates() {
        let today = date(1, 3, 2026);
        assert_eq!(pregnancy_calendar("bientôt", today), DATE_FORMAT_ERROR);
        assert_eq!(pregnancy_calendar("2026-09-15", today), DATE_FORMAT_ERROR);
    }

    #[test]
    fn vaccination_calendar_lists_the_whole_schedule() {
        let reply = vaccination_calendar("01/01/2026");
        assert!(reply.starts_with("Calendrier de vaccination"));
        assert!(reply.contains("• BCG : 01/01/2026"));
        // 2 months = 60 days after birth.
        assert!(reply.contains("• Pneumo 1 PCV13 : 02/03/2026"));
        assert_eq!(reply.matches('•').count(), 26);
    }

    #[test]
    fn vaccination_calendar_rejects_bad_dates() {
        assert_eq!(vaccination_calendar("hier"), DATE_FORMAT_ERROR);
    }
}
