//! CLI commands

use anyhow::{Context, Result, bail};
use bukload_http::types::{
    AddSegmentRequest, CreateReviewRequest, CreateTravelRequest, RecommendCoursesRequest,
    ReviewPageRequest, SaveCourseRequest, SignupRequest, UpdateProfileRequest,
};
use bukload_http::{BukloadClient, ClientConfig};
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        login_id: String,

        /// Password (prefer the environment variable)
        #[arg(long, env = "BUKLOAD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and remember the session
    Signup(SignupArgs),

    /// Forget the saved session
    Logout,

    /// Show whether a session is saved
    Status,

    /// Show or edit the account
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// Answer the questionnaire and get recommended courses
    Plan(PlanArgs),

    /// Find places, e.g. to get a place id for `courses add-stop`
    Places {
        #[command(subcommand)]
        command: PlaceCommands,
    },

    /// Saved courses
    Courses {
        #[command(subcommand)]
        command: CourseCommands,
    },

    /// Reviews written by the current user
    Reviews {
        #[command(subcommand)]
        command: ReviewCommands,
    },

    /// Loyalty points
    Points {
        #[command(subcommand)]
        command: PointCommands,
    },
}

#[derive(Args)]
pub struct SignupArgs {
    #[arg(long)]
    login_id: String,
    #[arg(long, env = "BUKLOAD_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to the password
    #[arg(long)]
    password_confirm: Option<String>,
    #[arg(long)]
    name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    birth_date: String,
    #[arg(long)]
    email: String,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Where the trip starts
    #[arg(long)]
    departure: String,
    /// Trip length in days
    #[arg(long, default_value = "1")]
    days: u32,
    /// Budget in KRW
    #[arg(long, default_value = "0")]
    budget: u64,
    /// F, M or OTHER
    #[arg(long, default_value = "OTHER")]
    gender: String,
    /// YYYY-MM-DD
    #[arg(long)]
    birth_date: String,
    /// Who is coming along
    #[arg(long, default_value = "alone")]
    companions: String,
    /// Interest tags, comma separated
    #[arg(long, value_delimiter = ',')]
    style: Vec<String>,
    #[arg(long)]
    theme_id: Option<i64>,
    /// Free-text wishes
    #[arg(long)]
    note: Option<String>,
    /// Save the n-th recommended course (1-based)
    #[arg(long)]
    save: Option<usize>,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Show account details
    Show,
    /// Update editable fields
    Update {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        preferred_theme: Option<String>,
        #[arg(long)]
        home_location: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PlaceCommands {
    /// Search places by name
    Search {
        /// Place name or keyword
        query: String,
        /// Print only the first match
        #[arg(long)]
        first: bool,
    },
}

#[derive(Subcommand)]
pub enum CourseCommands {
    /// List saved courses
    List,
    /// Show a course with its stops
    Show { course_id: i64 },
    /// Add a place to a course
    AddStop {
        course_id: i64,
        #[arg(long)]
        place_id: String,
        #[arg(long)]
        order_no: u32,
    },
    /// Remove a stop from a course
    RemoveStop { course_id: i64, segment_id: i64 },
    /// Set the visiting order, e.g. `--order 12,10,11`
    Reorder {
        course_id: i64,
        #[arg(long, value_delimiter = ',', required = true)]
        order: Vec<i64>,
    },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Write a review for a course stop
    Write {
        #[arg(long)]
        segment_id: i64,
        #[arg(long)]
        content: String,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// List reviews
    List {
        /// Follow pagination to the end
        #[arg(long)]
        all: bool,
    },
    /// Delete a review
    Delete { review_id: i64 },
}

#[derive(Subcommand)]
pub enum PointCommands {
    /// Current total
    Summary,
    /// Earned and spent entries
    History,
}

impl Commands {
    pub async fn execute(self, config: &ClientConfig) -> Result<()> {
        let client = BukloadClient::from_config(config)?;
        debug!(state_dir = %config.state_dir.display(), "client ready");

        match self {
            Self::Login { login_id, password } => {
                client.login(&login_id, password).await?;
                println!("Logged in as {login_id}");
                Ok(())
            }
            Self::Signup(args) => signup(&client, args).await,
            Self::Logout => {
                client.logout()?;
                println!("Logged out");
                Ok(())
            }
            Self::Status => {
                if client.is_logged_in() {
                    println!("Logged in ({})", client.base_url());
                } else {
                    println!("Not logged in");
                }
                Ok(())
            }
            Self::Account { command } => command.execute(&client).await,
            Self::Plan(args) => plan(&client, args).await,
            Self::Places { command } => command.execute(&client).await,
            Self::Courses { command } => command.execute(&client).await,
            Self::Reviews { command } => command.execute(&client).await,
            Self::Points { command } => command.execute(&client).await,
        }
    }
}

impl AccountCommands {
    async fn execute(self, client: &BukloadClient) -> Result<()> {
        match self {
            Self::Show => print_json(&client.me().await?),
            Self::Update {
                nickname,
                preferred_theme,
                home_location,
            } => {
                let request = UpdateProfileRequest {
                    nickname,
                    preferred_theme,
                    home_location,
                };
                client.update_me(&request).await?;
                println!("Account updated");
                Ok(())
            }
        }
    }
}

impl PlaceCommands {
    async fn execute(self, client: &BukloadClient) -> Result<()> {
        match self {
            Self::Search { query, first } => {
                let places = client.search_places(&query).await?;
                if places.is_empty() {
                    bail!("no place matches '{query}'");
                }
                if first {
                    print_json(&places[0])
                } else {
                    print_json(&places)
                }
            }
        }
    }
}

impl CourseCommands {
    async fn execute(self, client: &BukloadClient) -> Result<()> {
        match self {
            Self::List => print_json(&client.my_courses().await?),
            Self::Show { course_id } => print_json(&client.course_detail(course_id).await?),
            Self::AddStop {
                course_id,
                place_id,
                order_no,
            } => {
                let request = AddSegmentRequest { place_id, order_no };
                client.add_segment(course_id, &request).await?;
                print_json(&client.course_detail(course_id).await?)
            }
            Self::RemoveStop {
                course_id,
                segment_id,
            } => {
                client.delete_segment(course_id, segment_id).await?;
                print_json(&client.course_detail(course_id).await?)
            }
            Self::Reorder { course_id, order } => {
                let current = client.course_detail(course_id).await?;
                check_reorder(&current.segment_order(), &order)?;
                client.reorder_segments(course_id, order).await?;
                print_json(&client.course_detail(course_id).await?)
            }
        }
    }
}

impl ReviewCommands {
    async fn execute(self, client: &BukloadClient) -> Result<()> {
        match self {
            Self::Write {
                segment_id,
                content,
                photo_url,
            } => {
                if content.trim().is_empty() {
                    bail!("review content must not be empty");
                }
                let request = CreateReviewRequest {
                    course_segment_id: segment_id,
                    content,
                    photo_url,
                };
                print_json(&client.create_review(&request).await?)
            }
            Self::List { all } => {
                let mut request = ReviewPageRequest::first();
                let mut reviews = Vec::new();
                loop {
                    let page = client.my_reviews(&request).await?;
                    let next = page.next_request(&request);
                    reviews.extend(page.items);
                    match next {
                        Some(next) if all => request = next,
                        _ => break,
                    }
                }
                print_json(&reviews)
            }
            Self::Delete { review_id } => {
                client.delete_review(review_id).await?;
                println!("Review {review_id} deleted");
                Ok(())
            }
        }
    }
}

impl PointCommands {
    async fn execute(self, client: &BukloadClient) -> Result<()> {
        match self {
            Self::Summary => print_json(&client.points_summary().await?),
            Self::History => print_json(&client.points_history().await?),
        }
    }
}

async fn signup(client: &BukloadClient, args: SignupArgs) -> Result<()> {
    let password_confirm = args
        .password_confirm
        .unwrap_or_else(|| args.password.clone());
    let request = SignupRequest {
        login_id: args.login_id,
        password: args.password,
        password_confirm,
        name: args.name,
        birth_date: args.birth_date,
        email: args.email,
    };
    let login_id = request.login_id.clone();
    client.signup(request).await?;
    println!("Account {login_id} created and logged in");
    Ok(())
}

async fn plan(client: &BukloadClient, args: PlanArgs) -> Result<()> {
    let request = CreateTravelRequest {
        theme_id: args.theme_id,
        departure_location: args.departure,
        travel_days: args.days,
        budget: args.budget,
        gender: args.gender,
        birth_date: args.birth_date,
        companions: args.companions,
        style: args.style.join(","),
        additional_request: args.note,
    };

    let request_id = client.create_travel_request(&request).await?;
    info!(request_id, "travel request created");

    let region = client.recommend_region(request_id).await?;
    println!("Recommended region: {} ({})", region.region, region.comment);

    let recommended = client
        .recommend_courses(&RecommendCoursesRequest {
            request_id,
            anchor_id: Some(region.anchor_id.clone()),
        })
        .await?;
    for (index, course) in recommended.courses.iter().enumerate() {
        println!(
            "{}. {} - {} stops, {}, {}",
            index + 1,
            course.title,
            course.places.len(),
            course.total_distance,
            course.estimated_time
        );
    }

    if let Some(choice) = args.save {
        let course = choice
            .checked_sub(1)
            .and_then(|i| recommended.courses.get(i))
            .with_context(|| {
                format!(
                    "--save must be between 1 and {}",
                    recommended.courses.len()
                )
            })?;
        let saved = client
            .save_course(&SaveCourseRequest::from_recommendation(
                request_id,
                &region.anchor_id,
                course,
            ))
            .await?;
        println!("Saved as course {}", saved.course_id);
    }

    Ok(())
}

/// The new order must be a permutation of the course's current segment ids
fn check_reorder(current: &[i64], requested: &[i64]) -> Result<()> {
    let mut a = current.to_vec();
    let mut b = requested.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    if a != b {
        bail!("order must list each of the course's segment ids exactly once: {current:?}");
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
