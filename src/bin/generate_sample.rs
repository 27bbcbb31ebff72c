use anyhow::{Context, Result};

const COUNTRIES: [&str; 8] = [
    "United States",
    "India",
    "United Kingdom",
    "Japan",
    "South Korea",
    "Spain",
    "France, Belgium",
    "Canada, United States",
];

const MOVIE_GENRES: [&str; 8] = [
    "Dramas",
    "Comedies",
    "Documentaries",
    "Action & Adventure",
    "International Movies",
    "Romantic Movies",
    "Horror Movies",
    "Thrillers",
];

const TV_GENRES: [&str; 6] = [
    "International TV Shows",
    "TV Dramas",
    "Crime TV Shows",
    "Kids' TV",
    "Docuseries",
    "TV Comedies",
];

const RATINGS: [&str; 6] = ["G", "PG", "PG-13", "R", "TV-14", "TV-MA"];

const TITLE_WORDS: [&str; 16] = [
    "Love", "Night", "City", "Secret", "Last", "Road", "Family", "Dark", "Summer", "Heart",
    "War", "Kingdom", "Dream", "Island", "Ghost", "Legacy",
];

const DESCRIPTIONS: [&str; 8] = [
    "A heartwarming story of love and friendship that brings a family together.",
    "Two unlikely friends discover joy and hope on a wonderful summer adventure.",
    "A brilliant detective hunts a killer through a city gripped by fear.",
    "After a tragic accident, a grieving widow struggles with loss and guilt.",
    "A documentary following farmers through a season of harvest.",
    "War breaks out and a soldier fights to survive the horror of the front.",
    "A talented young chef chases success in a competitive kitchen.",
    "",
];

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `0..n`.
    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    fn chance(&mut self, percent: usize) -> bool {
        self.below(100) < percent
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_catalog.csv";
    let n_rows = 500;

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "show_id",
        "type",
        "title",
        "director",
        "cast",
        "country",
        "date_added",
        "release_year",
        "rating",
        "duration",
        "listed_in",
        "description",
    ])?;

    for i in 0..n_rows {
        let is_movie = rng.chance(70);
        let title = format!("{} {}", rng.pick(&TITLE_WORDS), rng.pick(&TITLE_WORDS));
        let release_year = 1990 + rng.below(32);
        let year_added = (release_year + rng.below(6)).clamp(2015, 2021);

        // a few rows exercise the loader's recovery paths
        let date_added = match rng.below(40) {
            0 => String::new(),
            1 => "sometime soon".to_string(),
            _ => format!("{} {}, {year_added}", MONTHS[rng.below(12)], 1 + rng.below(28)),
        };
        let country = if rng.chance(8) { "" } else { rng.pick(&COUNTRIES) };

        let genre_pool: &[&str] = if is_movie { &MOVIE_GENRES } else { &TV_GENRES };
        let n_genres = 1 + rng.below(3);
        let mut genres: Vec<&str> = Vec::with_capacity(n_genres);
        for _ in 0..n_genres {
            let g = rng.pick(genre_pool);
            if !genres.contains(&g) {
                genres.push(g);
            }
        }

        let duration = if is_movie {
            format!("{} min", 70 + rng.below(90))
        } else {
            match 1 + rng.below(5) {
                1 => "1 Season".to_string(),
                n => format!("{n} Seasons"),
            }
        };

        writer.write_record([
            format!("s{}", i + 1),
            if is_movie { "Movie" } else { "TV Show" }.to_string(),
            title,
            if rng.chance(30) {
                String::new()
            } else {
                format!("Director {}", rng.below(60))
            },
            if rng.chance(10) {
                String::new()
            } else {
                format!("Actor {}, Actor {}", rng.below(200), rng.below(200))
            },
            country.to_string(),
            date_added,
            release_year.to_string(),
            rng.pick(&RATINGS).to_string(),
            duration,
            genres.join(", "),
            rng.pick(&DESCRIPTIONS).to_string(),
        ])?;
    }
    writer.flush().context("flushing output")?;

    println!("Wrote {n_rows} titles to {output_path}");
    Ok(())
}
