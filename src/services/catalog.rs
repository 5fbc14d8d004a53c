use chrono::NaiveDate;

/// One movie from the curated "now showing" feed.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub external_id: String,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub duration: i64,
    pub poster: String,
    pub release_date: NaiveDate,
    pub rating: Option<f64>,
}

const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

fn entry(
    external_id: &str,
    title: &str,
    description: &str,
    genre: &str,
    duration: i64,
    poster: String,
    release_date: NaiveDate,
) -> CatalogEntry {
    CatalogEntry {
        external_id: external_id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        genre: genre.to_string(),
        duration,
        poster,
        release_date,
        rating: None,
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid curated release date")
}

/// The curated catalog, in display order. This stands in for the upstream
/// distribution feed and is deliberately fixed.
pub fn curated_catalog() -> Vec<CatalogEntry> {
    vec![
        entry(
            "hollywood_016",
            "Interstellar",
            "The adventures of a group of explorers who make use of a newly discovered wormhole to surpass the limitations on human space travel and conquer the vast distances involved in an interstellar voyage.",
            "Sci-Fi",
            169,
            "/assets/interstellar.png".to_string(),
            date(2014, 11, 7),
        ),
        entry(
            "hollywood_001",
            "Deadpool & Wolverine",
            "Ryan Reynolds and Hugh Jackman team up in this R-rated MCU adventure.",
            "Action",
            128,
            format!("{}/8cdWjvZQUExUUTzyp4t6EDMubfO.jpg", POSTER_BASE),
            date(2024, 7, 26),
        ),
        entry(
            "hollywood_002",
            "Wicked",
            "Cynthia Erivo and Ariana Grande star in the highly anticipated Broadway musical adaptation.",
            "Drama",
            160,
            format!("{}/c5Tqxeo1UpBvnAc3csUm7j3hlQl.jpg", POSTER_BASE),
            date(2024, 11, 22),
        ),
        entry(
            "hollywood_003",
            "Gladiator II",
            "Paul Mescal stars in Ridley Scott's epic sequel to the Oscar-winning original.",
            "Action",
            148,
            format!("{}/2cxhvwyEwRlysAmRH4iodkvo0z5.jpg", POSTER_BASE),
            date(2024, 11, 22),
        ),
        entry(
            "hollywood_004",
            "Moana 2",
            "Moana and Maui return for another ocean adventure in this Disney animated sequel.",
            "Animation",
            100,
            format!("{}/yh64qw9mgXBvlaWDi7Q9tpUBAvH.jpg", POSTER_BASE),
            date(2024, 11, 27),
        ),
        entry(
            "hollywood_005",
            "Dune: Part Two",
            "Paul Atreides unites with Chani and the Fremen while seeking revenge against those who destroyed his family.",
            "Sci-Fi",
            166,
            format!("{}/1pdfLvkbY9ohJlCjQH2CZjjYVvJ.jpg", POSTER_BASE),
            date(2024, 3, 1),
        ),
        entry(
            "hollywood_006",
            "Inside Out 2",
            "Riley enters her teenage years and new emotions arrive at headquarters.",
            "Animation",
            96,
            format!("{}/vpnVM9B6NMmQpWeZvzLvDESb2QY.jpg", POSTER_BASE),
            date(2024, 6, 14),
        ),
        entry(
            "hollywood_007",
            "Venom: The Last Dance",
            "Tom Hardy returns as Venom in the final chapter of the trilogy.",
            "Action",
            109,
            format!("{}/k42Owka8v91trK1qMYwCQCNwJKr.jpg", POSTER_BASE),
            date(2024, 10, 25),
        ),
        entry(
            "hollywood_008",
            "A Quiet Place: Day One",
            "Lupita Nyong'o stars in this prequel exploring the first day of the alien invasion.",
            "Horror",
            99,
            format!("{}/yrpPYKijwdMHyTGIOd1iK1h0Xno.jpg", POSTER_BASE),
            date(2024, 6, 28),
        ),
        entry(
            "hollywood_009",
            "Beetlejuice Beetlejuice",
            "Michael Keaton returns as the ghost with the most in Tim Burton's long-awaited sequel.",
            "Comedy",
            104,
            format!("{}/kKgQzkUCnQmeTPkyIwHly2t6ZFI.jpg", POSTER_BASE),
            date(2024, 9, 6),
        ),
        entry(
            "hollywood_010",
            "The Wild Robot",
            "A robot stranded on an island must learn to adapt to its surroundings and build relationships.",
            "Animation",
            102,
            format!("{}/wTnV3PCVW5O92JMrFvvrRcV39RU.jpg", POSTER_BASE),
            date(2024, 9, 27),
        ),
        entry(
            "hollywood_011",
            "Joker: Folie à Deux",
            "Joaquin Phoenix returns as Arthur Fleck alongside Lady Gaga in this musical psychological thriller.",
            "Thriller",
            138,
            format!("{}/aciP8Km0waTLXEYf5ybFK5CSUxl.jpg", POSTER_BASE),
            date(2024, 10, 4),
        ),
        entry(
            "hollywood_012",
            "Kingdom of the Planet of the Apes",
            "Many years after Caesar's reign, a young ape goes on a journey that will define the future.",
            "Sci-Fi",
            145,
            format!("{}/gKkl37BQuKTanygYQG1pyYgLVgf.jpg", POSTER_BASE),
            date(2024, 5, 10),
        ),
        entry(
            "hollywood_013",
            "Furiosa: A Mad Max Saga",
            "Anya Taylor-Joy stars in this prequel to Mad Max: Fury Road, revealing the origin of Furiosa.",
            "Action",
            148,
            format!("{}/iADOJ8Zymht2JPMoy3R7xceZprc.jpg", POSTER_BASE),
            date(2024, 5, 24),
        ),
        entry(
            "hollywood_014",
            "Godzilla x Kong: The New Empire",
            "Two ancient titans clash in an epic battle as humans unravel their intertwined origins.",
            "Action",
            115,
            format!("{}/tM26baWgQyYXefTZNy9F7H4yqJ7.jpg", POSTER_BASE),
            date(2024, 3, 29),
        ),
        entry(
            "hollywood_015",
            "Kung Fu Panda 4",
            "Po must train a new Dragon Warrior while facing a wicked sorceress who can shapeshift.",
            "Animation",
            94,
            format!("{}/kDp1vUBnMpe8ak4rjgl3cLELqjU.jpg", POSTER_BASE),
            date(2024, 3, 8),
        ),
    ]
}
