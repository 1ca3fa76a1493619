use refund_recon::domain::ports::ExceptionRepositoryBox;
use refund_recon::domain::record::ExceptionRecord;
use refund_recon::infrastructure::in_memory::InMemoryExceptionRepository;
use refund_recon::interfaces::csv::record_reader::RecordReader;
use std::fs::File;

fn fixture_records() -> Vec<ExceptionRecord> {
    let file = File::open("tests/fixtures/exceptions.csv").unwrap();
    RecordReader::new(file)
        .records()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[tokio::test]
async fn test_repository_as_trait_object() {
    let repository: ExceptionRepositoryBox = Box::new(InMemoryExceptionRepository::new());

    // Verify Send + Sync by moving the boxed port into a task
    let handle = tokio::spawn(async move {
        for record in fixture_records() {
            repository.insert(record).await.unwrap();
        }
        repository.list().await.unwrap()
    });

    let listed = handle.await.unwrap();
    assert_eq!(listed, fixture_records());
}

#[tokio::test]
async fn test_shared_repository_clones_see_updates() {
    let repository = InMemoryExceptionRepository::with_records(fixture_records()).unwrap();
    let writer: ExceptionRepositoryBox = Box::new(repository.clone());
    let reader: ExceptionRepositoryBox = Box::new(repository);

    let mut record = writer.get("err-004").await.unwrap().unwrap();
    record.error_message = "reviewed".to_string();
    writer.update(record).await.unwrap();

    let seen = reader.get("err-004").await.unwrap().unwrap();
    assert_eq!(seen.error_message, "reviewed");
}
