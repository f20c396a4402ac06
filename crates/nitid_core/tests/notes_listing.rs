use chrono::{DateTime, Duration, TimeZone, Utc};
use nitid_core::{
    sort_notes, unique_id_prefixes, FsNoteRepository, IdGenerator, Note, NoteFilter, NoteKind,
    NoteRepository, NoteService, NoteStatus, RepoError, SearchError, SearchQuery, SortMode,
    NoteServiceError, VaultError,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::{tempdir, TempDir};

struct Fixture {
    dir: TempDir,
    repo: FsNoteRepository,
    ids: IdGenerator,
    rng: StdRng,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let repo = FsNoteRepository::new(dir.path());
        repo.init().unwrap();
        Self {
            dir,
            repo,
            ids: IdGenerator::new(),
            rng: StdRng::seed_from_u64(42),
        }
    }

    fn add(&mut self, title: &str, updated_at: DateTime<Utc>, edit: impl FnOnce(&mut Note)) -> Note {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let id = self.ids.generate(created, &mut self.rng).unwrap();
        let mut note = Note::new(id, title, NoteKind::Note, created);
        note.updated_at = updated_at;
        edit(&mut note);
        self.repo.save_note(None, &note).unwrap().note
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 25, hour, 0, 0).unwrap()
}

fn ids(notes: &[nitid_core::NoteFile]) -> Vec<String> {
    notes.iter().map(|item| item.note.id.clone()).collect()
}

#[test]
fn listing_orders_by_updated_desc_then_id_desc() {
    let mut fx = Fixture::new();
    let older = fx.add("older", at(8), |_| {});
    let tie_a = fx.add("tie a", at(9), |_| {});
    let tie_b = fx.add("tie b", at(9), |_| {});
    assert!(tie_a.id < tie_b.id);

    let listed = fx.repo.list_notes(&NoteFilter::default()).unwrap();
    assert_eq!(ids(&listed), vec![tie_b.id, tie_a.id, older.id]);
}

#[test]
fn missing_notes_directory_lists_nothing() {
    let dir = tempdir().unwrap();
    let repo = FsNoteRepository::new(dir.path());
    assert!(repo.list_notes(&NoteFilter::default()).unwrap().is_empty());
}

#[test]
fn filters_apply_exact_matches() {
    let mut fx = Fixture::new();
    let eng = fx.add("eng note", at(8), |note| {
        note.domain = "eng".to_string();
        note.tags = vec!["go".to_string()];
    });
    let inbox = fx.add("inbox note", at(9), |note| {
        note.tags = vec!["go".to_string(), "ideas".to_string()];
    });
    let adr = fx.add("adr", at(10), |note| {
        note.kind = NoteKind::Adr;
        note.domain = "eng".to_string();
        note.status = Some(NoteStatus::Archived);
    });

    let by_domain = fx
        .repo
        .list_notes(&NoteFilter::default().with_domain("eng"))
        .unwrap();
    assert_eq!(ids(&by_domain), vec![adr.id.clone(), eng.id.clone()]);

    let by_tag = fx
        .repo
        .list_notes(&NoteFilter::default().with_tag("go"))
        .unwrap();
    assert_eq!(ids(&by_tag), vec![inbox.id.clone(), eng.id.clone()]);

    let by_status = fx
        .repo
        .list_notes(&NoteFilter::default().with_status(NoteStatus::Inbox))
        .unwrap();
    assert_eq!(ids(&by_status), vec![inbox.id.clone()]);

    let by_kind_and_domain = fx
        .repo
        .list_notes(
            &NoteFilter::default()
                .with_kind(NoteKind::Adr)
                .with_domain("eng"),
        )
        .unwrap();
    assert_eq!(ids(&by_kind_and_domain), vec![adr.id]);
}

#[test]
fn one_malformed_file_aborts_the_listing() {
    let mut fx = Fixture::new();
    fx.add("fine", at(8), |_| {});
    fs::write(
        fx.dir.path().join("notes/inbox/broken.md"),
        "no frontmatter here\n",
    )
    .unwrap();

    let err = fx.repo.list_notes(&NoteFilter::default()).unwrap_err();
    assert!(matches!(err, RepoError::Vault(VaultError::Parse { .. })));
}

#[test]
fn non_markdown_files_are_ignored() {
    let mut fx = Fixture::new();
    fx.add("fine", at(8), |_| {});
    fs::write(fx.dir.path().join("notes/inbox/readme.txt"), "plain").unwrap();
    assert_eq!(fx.repo.list_notes(&NoteFilter::default()).unwrap().len(), 1);
}

#[test]
fn service_list_applies_requested_sort() {
    let mut fx = Fixture::new();
    let b = fx.add("beta", at(8), |_| {});
    let a = fx.add("Alpha", at(9), |_| {});
    let service = NoteService::new(FsNoteRepository::new(fx.dir.path()));

    let by_title = service
        .list(&NoteFilter::default(), SortMode::Title, true)
        .unwrap();
    assert_eq!(ids(&by_title), vec![a.id.clone(), b.id.clone()]);

    let mut by_updated_asc = by_title.clone();
    sort_notes(&mut by_updated_asc, SortMode::Updated, true);
    assert_eq!(ids(&by_updated_asc), vec![b.id, a.id]);
}

#[test]
fn find_matches_any_field_in_listing_order() {
    let mut fx = Fixture::new();
    let by_title = fx.add("Retry budget", at(8), |_| {});
    let by_body = fx.add("Queues", at(9), |note| {
        note.body = "Remember the RETRY storm.".to_string();
    });
    let by_tag = fx.add("Clients", at(10), |note| {
        note.tags = vec!["retry-policy".to_string()];
    });
    fx.add("Unrelated", at(11), |_| {});
    let service = NoteService::new(FsNoteRepository::new(fx.dir.path()));

    let hits = service.find(&SearchQuery::new("  Retry ")).unwrap();
    assert_eq!(ids(&hits), vec![by_tag.id.clone(), by_body.id, by_title.id]);

    let capped = service.find(&SearchQuery::new("retry").with_limit(1)).unwrap();
    assert_eq!(ids(&capped), vec![by_tag.id]);
}

#[test]
fn find_matches_domain_and_respects_filter() {
    let mut fx = Fixture::new();
    let filed = fx.add("Design", at(8), |note| note.domain = "payments".to_string());
    fx.add("Payments idea", at(9), |_| {});
    let service = NoteService::new(FsNoteRepository::new(fx.dir.path()));

    let query = SearchQuery::new("payments")
        .with_filter(NoteFilter::default().with_status(NoteStatus::Active));
    assert_eq!(ids(&service.find(&query).unwrap()), vec![filed.id]);
}

#[test]
fn find_rejects_blank_query_and_zero_limit() {
    let fx = Fixture::new();
    let service = NoteService::new(FsNoteRepository::new(fx.dir.path()));

    assert!(matches!(
        service.find(&SearchQuery::new("   ")),
        Err(NoteServiceError::Search(SearchError::EmptyQuery))
    ));
    assert!(matches!(
        service.find(&SearchQuery::new("x").with_limit(0)),
        Err(NoteServiceError::Search(SearchError::InvalidLimit(0)))
    ));
}

#[test]
fn short_ids_are_unique_within_the_listing() {
    let mut fx = Fixture::new();
    for hour in 0..5 {
        fx.add("same millisecond", at(8) + Duration::minutes(hour), |_| {});
    }
    let listed = fx.repo.list_notes(&NoteFilter::default()).unwrap();
    let prefixes = unique_id_prefixes(&listed, 4);

    assert_eq!(prefixes.len(), listed.len());
    for item in &listed {
        let short = &prefixes[&item.note.id];
        assert!(short.len() >= 4);
        assert!(item.note.id.starts_with(short.as_str()));
        let sharing = listed
            .iter()
            .filter(|other| other.note.id.starts_with(short.as_str()))
            .count();
        assert_eq!(sharing, 1, "{short} is not unique");
    }
}
