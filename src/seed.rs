//! Sample data and JSON import.
//!
//! `cguide seed` loads a fictional Richmond, VA tech community: five venues,
//! five companies, five meetup groups and one event per group, scheduled
//! weekly from three days after today. `cguide seed --file data.json` loads
//! `{ "venues": [..], "companies": [..], "meetups": [..], "events": [..] }`
//! instead.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

use community_guide_core::models::{Company, Contact, Event, MeetupGroup, Venue};
use community_guide_core::{Clock, LoadReport, SeedData, SystemClock};

use crate::config::Config;
use crate::service;

/// Load `path`, or the built-in sample when `None`, optionally clearing the
/// table first.
pub async fn run_seed(config: &Config, file: Option<&Path>, clear: bool) -> Result<()> {
    let data = match file {
        Some(path) => load_seed_file(path)?,
        None => sample_data(SystemClock.today()),
    };

    let dal = service::open_data_access(config).await?;
    if clear {
        let removed = dal.clear_all().await?;
        println!("Cleared {} items.", removed);
    }

    let report = dal.bulk_load(&data).await;
    print_report(&report);
    if report.failed > 0 {
        anyhow::bail!("{} records could not be written", report.failed);
    }
    Ok(())
}

pub async fn run_clear(config: &Config) -> Result<()> {
    let dal = service::open_data_access(config).await?;
    let removed = dal.clear_all().await?;
    println!("Cleared {} items.", removed);
    Ok(())
}

fn print_report(report: &LoadReport) {
    println!("Seed complete");
    println!("  venues:    {}", report.venues);
    println!("  companies: {}", report.companies);
    println!("  meetups:   {}", report.meetups);
    println!("  events:    {}", report.events);
    if report.skipped > 0 {
        println!("  skipped:   {}", report.skipped);
    }
    if report.failed > 0 {
        println!("  failed:    {}", report.failed);
    }
    println!("  loaded:    {}", report.loaded());
}

pub fn load_seed_file(path: &Path) -> Result<SeedData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file: {}", path.display()))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn links(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn contact(phone: &str, email: Option<&str>, website: &str) -> Contact {
    Contact {
        phone: Some(phone.to_string()),
        email: email.map(str::to_string),
        website: Some(website.to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn venue(
    id: &str,
    name: &str,
    address: &str,
    kind: &str,
    capacity: u32,
    amenities: &[&str],
    contact: Contact,
    description: &str,
) -> Venue {
    Venue {
        id: id.to_string(),
        name: name.to_string(),
        address: address.to_string(),
        venue_type: Some(kind.to_string()),
        capacity,
        amenities: strings(amenities),
        contact,
        description: Some(description.to_string()),
    }
}

fn venues() -> Vec<Venue> {
    vec![
        venue(
            "venue_startup_va",
            "Startup Virginia",
            "1717 E Cary St, Richmond, VA 23223",
            "coworking_space",
            150,
            &["wifi", "parking", "kitchen", "presentation_screen"],
            contact(
                "(804) 644-2476",
                Some("info@startupvirginia.org"),
                "https://startupvirginia.org",
            ),
            "Richmond's premier startup incubator and coworking space",
        ),
        venue(
            "venue_common_house",
            "Common House",
            "305 W Broad St, Richmond, VA 23220",
            "event_space",
            200,
            &["wifi", "valet_parking", "catering", "av_equipment"],
            contact(
                "(804) 612-1900",
                Some("events@commonhouserichmond.com"),
                "https://commonhouserichmond.com",
            ),
            "Upscale event venue in downtown Richmond",
        ),
        venue(
            "venue_vcu_engineering",
            "VCU School of Engineering",
            "401 W Main St, Richmond, VA 23284",
            "university",
            300,
            &["wifi", "parking", "presentation_equipment", "recording"],
            contact("(804) 828-3565", Some("engineering@vcu.edu"), "https://egr.vcu.edu"),
            "VCU's engineering school with modern tech facilities",
        ),
        venue(
            "venue_capital_one_cafe",
            "Capital One Café",
            "11800 W Broad St, Richmond, VA 23233",
            "cafe",
            50,
            &["wifi", "coffee", "casual_seating"],
            contact("(804) 360-3780", None, "https://www.capitalone.com/local/richmond"),
            "Modern café space for casual tech meetups",
        ),
        venue(
            "venue_libbie_mill",
            "Libbie Mill Library",
            "2100 Libbie Lake E St, Richmond, VA 23230",
            "library",
            80,
            &["wifi", "parking", "quiet_spaces", "group_rooms"],
            contact("(804) 501-5136", None, "https://henrico.lib.va.us"),
            "Modern library with excellent tech facilities",
        ),
    ]
}

struct CompanySeed<'a> {
    id: &'a str,
    name: &'a str,
    industry: &'a str,
    size: &'a str,
    employees: u64,
    headquarters: &'a str,
    stack: &'a [&'a str],
    description: &'a str,
    founded: i32,
    careers_url: Option<&'a str>,
    website: Option<&'a str>,
    projects: &'a [&'a str],
}

impl CompanySeed<'_> {
    fn build(&self) -> Company {
        Company {
            id: self.id.to_string(),
            name: self.name.to_string(),
            industry: self.industry.to_string(),
            size: Some(self.size.to_string()),
            employee_count: self.employees,
            headquarters: Some(self.headquarters.to_string()),
            tech_stack: strings(self.stack),
            description: Some(self.description.to_string()),
            founded: Some(self.founded),
            careers_url: self.careers_url.map(str::to_string),
            website: self.website.map(str::to_string),
            notable_projects: strings(self.projects),
        }
    }
}

fn companies() -> Vec<Company> {
    [
        CompanySeed {
            id: "company_carmax",
            name: "CarMax",
            industry: "automotive_tech",
            size: "large",
            employees: 25000,
            headquarters: "12800 Tuckahoe Creek Pkwy, Richmond, VA 23238",
            stack: &["Java", "Python", "React", "AWS", "Kubernetes"],
            description: "Fortune 500 used car retailer with major tech operations",
            founded: 1993,
            careers_url: Some("https://careers.carmax.com"),
            website: None,
            projects: &[
                "Digital car buying platform",
                "Mobile app development",
                "Data analytics",
            ],
        },
        CompanySeed {
            id: "company_capital_one",
            name: "Capital One",
            industry: "fintech",
            size: "large",
            employees: 50000,
            headquarters: "15000 Capital One Dr, Richmond, VA 23238",
            stack: &["Java", "Python", "Go", "AWS", "Machine Learning"],
            description: "Major financial services company with significant tech presence",
            founded: 1994,
            careers_url: Some("https://www.capitalonecareers.com"),
            website: None,
            projects: &["Mobile banking", "ML fraud detection", "Cloud infrastructure"],
        },
        CompanySeed {
            id: "company_flying_pig_labs",
            name: "Flying Pig Labs",
            industry: "software_development",
            size: "small",
            employees: 15,
            headquarters: "Richmond, VA",
            stack: &["Ruby on Rails", "JavaScript", "React", "PostgreSQL"],
            description: "Boutique software development consultancy",
            founded: 2010,
            careers_url: None,
            website: Some("https://flyingpiglabs.com"),
            projects: &[
                "Custom web applications",
                "E-commerce platforms",
                "API development",
            ],
        },
        CompanySeed {
            id: "company_dominion_energy",
            name: "Dominion Energy",
            industry: "energy_tech",
            size: "large",
            employees: 16000,
            headquarters: "120 Tredegar St, Richmond, VA 23219",
            stack: &["C#", ".NET", "SQL Server", "Azure", "IoT"],
            description: "Utility company with growing technology division",
            founded: 1983,
            careers_url: Some("https://careers.dominionenergy.com"),
            website: None,
            projects: &[
                "Smart grid technology",
                "Renewable energy systems",
                "Customer portal",
            ],
        },
        CompanySeed {
            id: "company_willow_tree",
            name: "WillowTree",
            industry: "mobile_development",
            size: "medium",
            employees: 300,
            headquarters: "107 S West St, Charlottesville, VA 22902",
            stack: &["Swift", "Kotlin", "React Native", "Node.js", "AWS"],
            description: "Leading mobile app development company with Richmond presence",
            founded: 2007,
            careers_url: None,
            website: Some("https://willowtreeapps.com"),
            projects: &[
                "HBO Max mobile app",
                "National Geographic apps",
                "Enterprise mobile solutions",
            ],
        },
    ]
    .iter()
    .map(CompanySeed::build)
    .collect()
}

#[allow(clippy::too_many_arguments)]
fn meetup(
    id: &str,
    name: &str,
    category: &str,
    description: &str,
    organizer: (&str, &str),
    members: u64,
    founded: &str,
    typical_venue: &str,
    focus: &[&str],
    social: &[(&str, &str)],
) -> MeetupGroup {
    MeetupGroup {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        description: Some(description.to_string()),
        organizer: Some(organizer.0.to_string()),
        organizer_company: Some(organizer.1.to_string()),
        member_count: members,
        founded: Some(founded.to_string()),
        meeting_frequency: Some("monthly".to_string()),
        typical_venue: Some(typical_venue.to_string()),
        focus_areas: strings(focus),
        social_links: links(social),
    }
}

fn meetups() -> Vec<MeetupGroup> {
    vec![
        meetup(
            "meetup_rva_cloud_wranglers",
            "RVA Cloud Wranglers",
            "cloud_computing",
            "Richmond's premier cloud computing meetup focusing on AWS, Azure, and GCP",
            ("Sarah Chen", "Capital One"),
            450,
            "2019-03-15",
            "venue_startup_va",
            &["AWS", "Azure", "DevOps", "Serverless", "Containers"],
            &[
                ("meetup", "https://meetup.com/rva-cloud-wranglers"),
                ("slack", "rva-cloud-wranglers.slack.com"),
                ("github", "https://github.com/rva-cloud-wranglers"),
            ],
        ),
        meetup(
            "meetup_richmond_python",
            "Richmond Python User Group",
            "programming_language",
            "Python enthusiasts in the Richmond area sharing knowledge and projects",
            ("Michael Rodriguez", "CarMax"),
            320,
            "2017-09-20",
            "venue_vcu_engineering",
            &["Python", "Data Science", "Web Development", "Machine Learning"],
            &[
                ("meetup", "https://meetup.com/richmond-python"),
                ("discord", "richmond-python"),
                ("github", "https://github.com/richmond-python"),
            ],
        ),
        meetup(
            "meetup_rva_js",
            "RVA.js",
            "programming_language",
            "JavaScript developers building the future of web applications",
            ("Jessica Park", "WillowTree"),
            280,
            "2018-01-12",
            "venue_common_house",
            &["JavaScript", "React", "Node.js", "TypeScript", "Full-stack"],
            &[
                ("meetup", "https://meetup.com/rva-js"),
                ("twitter", "@rvajs"),
                ("discord", "rvajs"),
            ],
        ),
        meetup(
            "meetup_richmond_data_science",
            "Richmond Data Science Meetup",
            "data_science",
            "Data scientists, analysts, and ML engineers sharing insights and techniques",
            ("Dr. Amanda Johnson", "VCU"),
            190,
            "2020-06-08",
            "venue_vcu_engineering",
            &["Machine Learning", "Statistics", "Python", "R", "Data Visualization"],
            &[
                ("meetup", "https://meetup.com/richmond-data-science"),
                ("linkedin", "richmond-data-science"),
            ],
        ),
        meetup(
            "meetup_rva_cybersecurity",
            "RVA Cybersecurity Guild",
            "cybersecurity",
            "Information security professionals protecting Richmond's digital infrastructure",
            ("David Kim", "Dominion Energy"),
            220,
            "2019-11-03",
            "venue_startup_va",
            &[
                "Network Security",
                "Ethical Hacking",
                "Compliance",
                "Incident Response",
            ],
            &[
                ("meetup", "https://meetup.com/rva-cybersecurity"),
                ("website", "https://rvacybersecurity.org"),
            ],
        ),
    ]
}

struct EventTemplate {
    meetup_id: &'static str,
    title: &'static str,
    description: &'static str,
    speaker: &'static str,
    speaker_bio: &'static str,
    end_time: &'static str,
    tags: &'static [&'static str],
}

const EVENT_TEMPLATES: &[EventTemplate] = &[
    EventTemplate {
        meetup_id: "meetup_rva_cloud_wranglers",
        title: "Serverless Architecture Best Practices",
        description: "Learn how to build scalable serverless applications on AWS Lambda",
        speaker: "Alex Thompson",
        speaker_bio: "Senior Cloud Architect at Capital One",
        end_time: "20:30",
        tags: &["AWS", "Lambda", "Serverless", "Architecture"],
    },
    EventTemplate {
        meetup_id: "meetup_richmond_python",
        title: "Building Machine Learning Pipelines with Python",
        description: "End-to-end ML pipeline development using scikit-learn and pandas",
        speaker: "Dr. Maria Santos",
        speaker_bio: "Lead Data Scientist at CarMax",
        end_time: "21:00",
        tags: &["Python", "Machine Learning", "Data Science", "MLOps"],
    },
    EventTemplate {
        meetup_id: "meetup_rva_js",
        title: "Modern React Patterns and Performance",
        description: "Advanced React techniques for building high-performance web apps",
        speaker: "Jordan Liu",
        speaker_bio: "Senior Frontend Engineer at WillowTree",
        end_time: "20:30",
        tags: &["React", "JavaScript", "Performance", "Frontend"],
    },
    EventTemplate {
        meetup_id: "meetup_richmond_data_science",
        title: "Deep Learning for Computer Vision",
        description: "Practical applications of CNNs and transfer learning",
        speaker: "Dr. Rachel Green",
        speaker_bio: "Assistant Professor at VCU Engineering",
        end_time: "21:30",
        tags: &["Deep Learning", "Computer Vision", "TensorFlow", "AI"],
    },
    EventTemplate {
        meetup_id: "meetup_rva_cybersecurity",
        title: "Zero Trust Security Architecture",
        description: "Implementing zero trust principles in enterprise environments",
        speaker: "Marcus Johnson",
        speaker_bio: "CISO at Dominion Energy",
        end_time: "20:30",
        tags: &["Security", "Zero Trust", "Enterprise", "Architecture"],
    },
];

fn short_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// One event per template, weekly from `today + 3 days`, each denormalizing
/// its meetup and the meetup's typical venue.
fn events(today: NaiveDate, meetups: &[MeetupGroup], venues: &[Venue]) -> Vec<Event> {
    let mut events = Vec::new();
    for (week, template) in EVENT_TEMPLATES.iter().enumerate() {
        let Some(meetup) = meetups.iter().find(|m| m.id == template.meetup_id) else {
            continue;
        };
        let venue = meetup
            .typical_venue
            .as_deref()
            .and_then(|id| venues.iter().find(|v| v.id == id));
        let day = today + Duration::weeks(week as i64) + Duration::days(3);
        let capacity = venue.map(|v| v.capacity).unwrap_or(150);
        // Roughly 15% of members register, never past capacity minus 20.
        let turnout = (meetup.member_count * 15 / 100) as u32;

        events.push(Event {
            id: format!("event_{}", short_id()),
            title: template.title.to_string(),
            description: template.description.to_string(),
            date: format!("{}T18:30:00", day.format("%Y-%m-%d")),
            start_time: "18:30".to_string(),
            end_time: Some(template.end_time.to_string()),
            venue_id: venue
                .map(|v| v.id.clone())
                .unwrap_or_else(|| "venue_startup_va".to_string()),
            venue_name: Some(
                venue
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| "Startup Virginia".to_string()),
            ),
            venue_address: Some(
                venue
                    .map(|v| v.address.clone())
                    .unwrap_or_else(|| "1717 E Cary St, Richmond, VA 23223".to_string()),
            ),
            meetup_id: meetup.id.clone(),
            meetup_name: Some(meetup.name.clone()),
            speaker: Some(template.speaker.to_string()),
            speaker_bio: Some(template.speaker_bio.to_string()),
            tags: strings(template.tags),
            capacity,
            registered: turnout.min(capacity.saturating_sub(20)),
            status: Some("upcoming".to_string()),
            requirements: strings(&["Laptop recommended", "Basic programming knowledge"]),
            cost: Some("Free".to_string()),
            rsvp_url: Some(format!(
                "https://meetup.com/{}/events/{}",
                meetup.name.to_lowercase().replace(' ', "-"),
                short_id()
            )),
            parking_info: Some(
                "Street parking available, paid parking in nearby garages".to_string(),
            ),
        });
    }
    events
}

/// The built-in Richmond sample, with events scheduled relative to `today`.
pub fn sample_data(today: NaiveDate) -> SeedData {
    let venues = venues();
    let meetups = meetups();
    let events = events(today, &meetups, &venues);
    SeedData {
        venues,
        companies: companies(),
        meetups,
        events,
    }
}
