use mongodb::{
    bson::{doc, Document},
    Collection,
};

use crate::db_mongo::models::Book;
use crate::errors::{QueryError, StepContext};

/// The sample bookstore inventory the query catalogue is written against.
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new("To Kill a Mockingbird", "Harper Lee", "Fiction", 1960, 12.99, true)
            .with_details(336, "J. B. Lippincott & Co."),
        Book::new("1984", "George Orwell", "Dystopian", 1949, 10.99, true)
            .with_details(328, "Secker & Warburg"),
        Book::new("The Great Gatsby", "F. Scott Fitzgerald", "Fiction", 1925, 9.99, true)
            .with_details(180, "Charles Scribner's Sons"),
        Book::new("Brave New World", "Aldous Huxley", "Dystopian", 1932, 11.50, false)
            .with_details(311, "Chatto & Windus"),
        Book::new("The Hobbit", "J.R.R. Tolkien", "Fantasy", 1937, 14.99, true)
            .with_details(310, "George Allen & Unwin"),
        Book::new("The Catcher in the Rye", "J.D. Salinger", "Fiction", 1951, 8.99, true)
            .with_details(224, "Little, Brown and Company"),
        Book::new("Pride and Prejudice", "Jane Austen", "Romance", 1813, 7.99, true)
            .with_details(432, "T. Egerton"),
        Book::new("The Lord of the Rings", "J.R.R. Tolkien", "Fantasy", 1954, 19.99, true)
            .with_details(1178, "Allen & Unwin"),
        Book::new("Animal Farm", "George Orwell", "Political Satire", 1945, 8.50, false)
            .with_details(112, "Secker & Warburg"),
        Book::new("The Alchemist", "Paulo Coelho", "Fiction", 1988, 10.99, true)
            .with_details(197, "HarperOne"),
        Book::new("Moby Dick", "Herman Melville", "Adventure", 1851, 12.50, false)
            .with_details(635, "Harper & Brothers"),
        Book::new("Wuthering Heights", "Emily Brontë", "Gothic Fiction", 1847, 9.99, true)
            .with_details(342, "Thomas Cautley Newby"),
        Book::new("Project Hail Mary", "Andy Weir", "Science Fiction", 2021, 16.99, true)
            .with_details(496, "Ballantine Books"),
        Book::new("Klara and the Sun", "Kazuo Ishiguro", "Science Fiction", 2021, 13.50, false)
            .with_details(303, "Faber & Faber"),
        Book::new("Educated", "Tara Westover", "Memoir", 2018, 14.00, true)
            .with_details(334, "Random House"),
    ]
}

/// Replace the contents of `collection` with [`sample_books`].
pub async fn seed_books(collection: &Collection<Document>) -> Result<usize, QueryError> {
    let removed = collection.delete_many(doc! {}).await.step("seed")?;

    if removed.deleted_count > 0 {
        tracing::info!(
            "Cleared {} existing documents from {}",
            removed.deleted_count,
            collection.name()
        );
    }

    let books = sample_books();
    let result = collection
        .clone_with_type::<Book>()
        .insert_many(&books)
        .await
        .step("seed")?;

    tracing::info!(
        "✓ Seeded {} books into {}",
        result.inserted_ids.len(),
        collection.name()
    );

    Ok(result.inserted_ids.len())
}
