use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::Set;

use super::{
    check_link, check_phone, flag, id, optional, required, FieldMap, LONG_TEXT, SHORT_TEXT,
};
use crate::db::{values::StringVec, Submission};
use crate::error::ValidationErrors;
use crate::model::{artist, venue};

#[derive(Clone, Debug, PartialEq)]
pub struct VenueForm {
    pub name: String,
    pub genres: StringVec,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
    pub image_link: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtistForm {
    pub name: String,
    pub genres: StringVec,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
    pub image_link: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowForm {
    pub venue_id: i64,
    pub artist_id: i64,
    /// `None` books the show at insert time.
    pub start_time: Option<DateTime<Utc>>,
}

/// Fields shared by venues and artists.
struct Profile {
    name: String,
    genres: StringVec,
    city: String,
    state: String,
    phone: String,
    website: Option<String>,
    facebook_link: Option<String>,
    seeking_description: Option<String>,
    image_link: String,
}

impl Profile {
    fn parse(fields: &FieldMap, errs: &mut ValidationErrors) -> Self {
        let name = required(fields, "name", None, errs);

        let genres = StringVec::ordered_set(fields.get_all("genres"));
        if genres.is_empty() {
            errs.push("genres", "at least one genre is required");
        }

        let city = required(fields, "city", Some(SHORT_TEXT), errs);
        let state = required(fields, "state", Some(SHORT_TEXT), errs);
        let phone = required(fields, "phone", Some(SHORT_TEXT), errs);
        if !phone.is_empty() {
            check_phone("phone", &phone, errs);
        }

        let website = optional(fields, &["website_link", "website"], SHORT_TEXT, errs);
        if let Some(link) = &website {
            check_link("website_link", link, errs);
        }
        let facebook_link = optional(fields, &["facebook_link"], SHORT_TEXT, errs);
        if let Some(link) = &facebook_link {
            check_link("facebook_link", link, errs);
        }
        let seeking_description = optional(fields, &["seeking_description"], LONG_TEXT, errs);

        let image_link = required(fields, "image_link", Some(LONG_TEXT), errs);
        if !image_link.is_empty() {
            check_link("image_link", &image_link, errs);
        }

        Profile {
            name,
            genres,
            city,
            state,
            phone,
            website,
            facebook_link,
            seeking_description,
            image_link,
        }
    }
}

impl VenueForm {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationErrors> {
        let mut errs = ValidationErrors::default();
        let p = Profile::parse(fields, &mut errs);
        let address = required(fields, "address", Some(SHORT_TEXT), &mut errs);
        let seeking_talent = flag(fields, "seeking_talent", &mut errs);
        if !errs.is_empty() {
            return Err(errs);
        }
        Ok(VenueForm {
            name: p.name,
            genres: p.genres,
            address,
            city: p.city,
            state: p.state,
            phone: p.phone,
            website: p.website,
            facebook_link: p.facebook_link,
            seeking_talent,
            seeking_description: p.seeking_description,
            image_link: p.image_link,
        })
    }
}

impl ArtistForm {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationErrors> {
        let mut errs = ValidationErrors::default();
        let p = Profile::parse(fields, &mut errs);
        let seeking_venue = flag(fields, "seeking_venue", &mut errs);
        if !errs.is_empty() {
            return Err(errs);
        }
        Ok(ArtistForm {
            name: p.name,
            genres: p.genres,
            city: p.city,
            state: p.state,
            phone: p.phone,
            website: p.website,
            facebook_link: p.facebook_link,
            seeking_venue,
            seeking_description: p.seeking_description,
            image_link: p.image_link,
        })
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// RFC 3339, or a zone-less timestamp read as UTC.
fn parse_start_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .map(|t| t.and_utc())
}

impl ShowForm {
    pub fn from_fields(fields: &FieldMap) -> Result<Self, ValidationErrors> {
        let mut errs = ValidationErrors::default();
        let artist_id = id(fields, "artist_id", &mut errs);
        let venue_id = id(fields, "venue_id", &mut errs);
        let start_time = match fields.text("start_time") {
            None => None,
            Some(v) => {
                let parsed = parse_start_time(v);
                if parsed.is_none() {
                    errs.push("start_time", "must look like YYYY-MM-DD HH:MM[:SS]");
                }
                parsed
            }
        };
        if !errs.is_empty() {
            return Err(errs);
        }
        Ok(ShowForm {
            venue_id,
            artist_id,
            start_time,
        })
    }
}

impl Submission for VenueForm {
    type Entity = venue::Entity;
    type ActiveModel = venue::ActiveModel;

    fn fill(self, model: &mut venue::ActiveModel) {
        model.name = Set(self.name);
        model.genres = Set(self.genres);
        model.address = Set(self.address);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.phone = Set(self.phone);
        model.website = Set(self.website);
        model.facebook_link = Set(self.facebook_link);
        model.seeking_talent = Set(self.seeking_talent);
        model.seeking_description = Set(self.seeking_description);
        model.image_link = Set(self.image_link);
    }
}

impl Submission for ArtistForm {
    type Entity = artist::Entity;
    type ActiveModel = artist::ActiveModel;

    fn fill(self, model: &mut artist::ActiveModel) {
        model.name = Set(self.name);
        model.genres = Set(self.genres);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.phone = Set(self.phone);
        model.website = Set(self.website);
        model.facebook_link = Set(self.facebook_link);
        model.seeking_venue = Set(self.seeking_venue);
        model.seeking_description = Set(self.seeking_description);
        model.image_link = Set(self.image_link);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn venue_fields() -> FieldMap {
        FieldMap::from_pairs([
            ("name", "The Musical Hop"),
            ("genres", "Jazz"),
            ("genres", "Reggae"),
            ("genres", "jazz"),
            ("address", "1015 Folsom Street"),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("phone", "123-123-1234"),
            ("website_link", "https://www.themusicalhop.com"),
            ("facebook_link", ""),
            ("seeking_talent", "y"),
            ("seeking_description", "We are on the lookout for a local artist"),
            ("image_link", "https://images.example.com/hop.jpg"),
        ])
    }

    #[test]
    fn test_venue_form_valid() {
        let form = VenueForm::from_fields(&venue_fields()).unwrap();
        assert_eq!(form.name, "The Musical Hop");
        assert_eq!(form.genres.0, vec!["Jazz", "Reggae"]);
        assert_eq!(form.website.as_deref(), Some("https://www.themusicalhop.com"));
        assert_eq!(form.facebook_link, None);
        assert!(form.seeking_talent);
    }

    #[test]
    fn test_venue_form_collects_every_error() {
        let fields = FieldMap::from_pairs([
            ("name", "  "),
            ("address", "1015 Folsom Street"),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("phone", "call me"),
            ("website_link", "not a url"),
            ("image_link", "ftp://images.example.com/hop.jpg"),
        ]);
        let errs = VenueForm::from_fields(&fields).unwrap_err();
        assert_eq!(
            errs.fields(),
            vec!["name", "genres", "phone", "website_link", "image_link"]
        );
    }

    #[test]
    fn test_length_limits() {
        let long = "a".repeat(SHORT_TEXT + 1);
        let fields = FieldMap::from_pairs([
            ("name", "Hall"),
            ("genres", "Jazz"),
            ("address", long.as_str()),
            ("city", "Oakland"),
            ("state", "CA"),
            ("phone", "510 555 0100"),
            ("image_link", "https://images.example.com/hall.jpg"),
        ]);
        let errs = VenueForm::from_fields(&fields).unwrap_err();
        assert_eq!(errs.fields(), vec!["address"]);

        let mut fields = venue_fields();
        fields.insert("seeking_description", "x".repeat(LONG_TEXT + 1));
        // first value wins for single-valued fields
        assert!(VenueForm::from_fields(&fields).is_ok());
    }

    #[test]
    fn test_artist_form_defaults() {
        let fields = FieldMap::from_pairs([
            ("name", "Guns N Petals"),
            ("genres", "Rock n Roll"),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("phone", "326-123-5000"),
            ("image_link", "https://images.example.com/gnp.jpg"),
        ]);
        let form = ArtistForm::from_fields(&fields).unwrap();
        assert!(!form.seeking_venue);
        assert_eq!(form.website, None);
        assert_eq!(form.seeking_description, None);
    }

    #[test]
    fn test_show_form() {
        let fields = FieldMap::from_pairs([
            ("artist_id", "4"),
            ("venue_id", "1"),
            ("start_time", "2035-04-01 20:00:00"),
        ]);
        let form = ShowForm::from_fields(&fields).unwrap();
        assert_eq!(form.artist_id, 4);
        assert_eq!(form.venue_id, 1);
        assert_eq!(
            form.start_time,
            Some(Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap())
        );

        let fields = FieldMap::from_pairs([
            ("artist_id", "4"),
            ("venue_id", "1"),
            ("start_time", "2035-04-01T22:00:00+02:00"),
        ]);
        let form = ShowForm::from_fields(&fields).unwrap();
        assert_eq!(
            form.start_time,
            Some(Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap())
        );

        let fields = FieldMap::from_pairs([("artist_id", "4"), ("venue_id", "1")]);
        assert_eq!(ShowForm::from_fields(&fields).unwrap().start_time, None);
    }

    #[test]
    fn test_show_form_invalid() {
        let fields = FieldMap::from_pairs([
            ("artist_id", "abc"),
            ("venue_id", "-1"),
            ("start_time", "next tuesday"),
        ]);
        let errs = ShowForm::from_fields(&fields).unwrap_err();
        assert_eq!(errs.fields(), vec!["artist_id", "venue_id", "start_time"]);
    }
}
