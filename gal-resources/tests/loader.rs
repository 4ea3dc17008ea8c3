mod common;

use std::sync::Arc;

use gal_resources::{
    BundleSource, LoadMode, LoaderEvent, LoaderOptions, MediaUrl, Payload, Property, PropertyMap,
    ResourceKind, ResourceState, VideoLoader, BITMAP_LOADER, NATIVE,
};

use crate::common::{next_event, Fixture};

#[test]
fn test_bitmap_load() {
    let fx = Fixture::new();
    let source = fx.png("a.png", 4, 2);
    let ctx = fx.context();

    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();
    let events = loader.subscribe();
    assert!(!loader.is_initialized());

    let resource = loader.load_now(&ctx, Some(&source)).unwrap();
    assert_eq!(resource.state(), ResourceState::Loaded);
    assert_eq!(resource.kind(), ResourceKind::Texture { width: 4, height: 2 });
    assert_eq!(resource.size(), 32);
    assert!(matches!(resource.payload().as_deref(), Some(Payload::Image(_))));

    assert!(loader.is_initialized());
    assert!(Arc::ptr_eq(&loader.get().unwrap(), &resource));
    assert_eq!(next_event(&events), LoaderEvent::LoadFinished { source });
}

#[test]
fn test_cached_resource_is_shared() {
    let fx = Fixture::new();
    let source = fx.png("a.png", 2, 2);
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();

    let first = loader.load_now(&ctx, Some(&source)).unwrap();
    std::fs::remove_file(fx.path(&source)).unwrap();
    let second = loader.load_now(&ctx, Some(&source)).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loader.cached_len(), 1);
    assert!(Arc::ptr_eq(&loader.cached(&source).unwrap(), &first));
}

#[test]
fn test_missing_bitmap() {
    let fx = Fixture::new();
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();
    let events = loader.subscribe();

    assert!(loader.load_now(&ctx, Some("missing.png")).is_none());
    assert!(loader.cached("missing.png").is_none());
    assert_eq!(loader.cached_len(), 0);
    assert!(loader.get().is_none());
    assert!(!loader.is_initialized());

    match next_event(&events) {
        LoaderEvent::LoadFailed { source, message } => {
            assert_eq!(source.as_deref(), Some("missing.png"));
            assert!(message.contains("missing.png"), "{}", message);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_failure_is_not_cached() {
    let fx = Fixture::new();
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();

    assert!(loader.load_now(&ctx, Some("later.png")).is_none());
    fx.png("later.png", 1, 1);
    assert!(loader.load_now(&ctx, Some("later.png")).is_some());
}

#[test]
fn test_corrupt_bitmap() {
    let fx = Fixture::new();
    let source = fx.file("broken.png", "not an image");
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();

    assert!(loader.load_now(&ctx, Some(&source)).is_none());
    assert_eq!(loader.cached_len(), 0);
}

#[test]
fn test_async_load() {
    let fx = Fixture::new();
    let source = fx.png("a.png", 3, 3);
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();
    let events = loader.subscribe();

    loader.load(&ctx, Some(&source), LoadMode::Async);
    assert_eq!(
        next_event(&events),
        LoaderEvent::LoadFinished {
            source: source.clone()
        }
    );

    let resource = loader.get().unwrap();
    assert_eq!(resource.url(), source);
    assert_eq!(resource.dimensions(), Some((3, 3)));
}

#[test]
fn test_async_failure() {
    let fx = Fixture::new();
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();
    let events = loader.subscribe();

    loader.load(&ctx, Some("missing.png"), LoadMode::Async);
    assert!(next_event(&events).is_failure());
}

#[test]
fn test_bound_source() {
    let fx = Fixture::new();
    let source = fx.png("bound.png", 1, 1);
    let ctx = fx.context();

    let mut properties = PropertyMap::default();
    properties.insert("source".into(), Property::from(source.as_str()));
    let loader = ctx
        .registration()
        .create_loader("file", "png", &properties)
        .unwrap();
    assert_eq!(loader.source_url(), Some(source.clone()));

    let events = loader.subscribe();
    loader.load(&ctx, None, LoadMode::Sync);
    assert_eq!(next_event(&events), LoaderEvent::LoadFinished { source });
}

#[test]
fn test_empty_source() {
    let fx = Fixture::new();
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();
    let events = loader.subscribe();

    loader.load(&ctx, None, LoadMode::Sync);
    loader.load(&ctx, Some(""), LoadMode::Async);
    assert!(loader.load_now(&ctx, None).is_none());

    for _ in 0..3 {
        match next_event(&events) {
            LoaderEvent::LoadFailed { source, .. } => assert_eq!(source, None),
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert_eq!(loader.cached_len(), 0);
}

#[test]
fn test_unload() {
    let fx = Fixture::new();
    let source = fx.png("a.png", 1, 1);
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();

    let resource = loader.load_now(&ctx, Some(&source)).unwrap();
    let events = loader.subscribe();

    loader.unload(&ctx, LoadMode::Sync);
    assert_eq!(next_event(&events), LoaderEvent::UnloadFinished);
    assert_eq!(loader.cached_len(), 0);
    assert!(loader.get().is_none());
    assert!(!loader.is_initialized());

    // handles held by callers stay valid
    assert!(resource.is_loaded());

    loader.load(&ctx, Some(&source), LoadMode::Sync);
    loader.unload(&ctx, LoadMode::Async);
    assert!(matches!(next_event(&events), LoaderEvent::LoadFinished { .. }));
    assert_eq!(next_event(&events), LoaderEvent::UnloadFinished);
    assert!(!loader.is_initialized());
}

#[test]
fn test_every_subscriber_is_notified() {
    let fx = Fixture::new();
    let source = fx.png("a.png", 1, 1);
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();

    let a = loader.subscribe();
    let b = loader.subscribe();
    drop(loader.subscribe());

    loader.load(&ctx, Some(&source), LoadMode::Sync);
    assert_eq!(a.try_iter().count(), 1);
    assert_eq!(b.try_iter().count(), 1);
}

#[test]
fn test_lenient_suffix() {
    let fx = Fixture::new();
    fx.png("pic.png", 2, 1);
    std::fs::copy(fx.path("pic.png"), fx.path("pic.bmp")).unwrap();
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();

    let resource = loader.load_now(&ctx, Some("pic.bmp")).unwrap();
    assert_eq!(resource.dimensions(), Some((2, 1)));
}

#[test]
fn test_strict_suffix() {
    let fx = Fixture::new();
    fx.png("pic.png", 2, 1);
    std::fs::copy(fx.path("pic.png"), fx.path("pic.bmp")).unwrap();
    let options = LoaderOptions {
        strict_suffix: true,
    };
    let ctx = fx.context_with(options, BundleSource::new());
    let loader = ctx
        .registration()
        .create_loader("file", "png", &PropertyMap::default())
        .unwrap();
    let events = loader.subscribe();

    assert!(loader.load_now(&ctx, Some("pic.bmp")).is_none());
    match next_event(&events) {
        LoaderEvent::LoadFailed { message, .. } => {
            assert!(message.contains("suffix mismatch"), "{}", message)
        }
        other => panic!("unexpected event: {:?}", other),
    }

    assert!(loader.load_now(&ctx, Some("pic.png")).is_some());
}

#[test]
fn test_bundled_bitmap() {
    let fx = Fixture::new();
    fx.png("images/a.png", 5, 5);
    let bundle = BundleSource::from_dir(fx.dir.path()).unwrap();
    assert_eq!(bundle.len(), 1);

    let ctx = fx.context_with(LoaderOptions::default(), bundle);
    let loader = ctx
        .registration()
        .create_loader("qrc", "png", &PropertyMap::default())
        .unwrap();

    let resource = loader.load_now(&ctx, Some("qrc:/images/a.png")).unwrap();
    assert_eq!(resource.dimensions(), Some((5, 5)));
    assert!(loader.load_now(&ctx, Some(":/images/b.png")).is_none());
}

#[test]
fn test_unsupported_protocol() {
    let fx = Fixture::new();
    let ctx = fx.context();

    let mut properties = PropertyMap::default();
    properties.insert("type".into(), Property::from(BITMAP_LOADER));
    properties.insert("protocol".into(), Property::from("http"));
    let loader = ctx
        .registration()
        .create(NATIVE, &properties)
        .and_then(|v| v.into_loader())
        .unwrap();
    let events = loader.subscribe();

    assert!(loader.load_now(&ctx, Some("http://example.com/a.png")).is_none());
    match next_event(&events) {
        LoaderEvent::LoadFailed { message, .. } => {
            assert!(message.contains("unsupported protocol"), "{}", message)
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[test]
fn test_manifest_expansion() {
    let fx = Fixture::new();
    fx.png("x.png", 1, 1);
    let manifest = fx.file(
        "m.json",
        r#"{
            "loaders": [
                { "source": "file://x.png" },
                { "source": "clip.mp4", "suffix": "MP4" },
                { "source": "notes.txt" },
                { "protocol": "file" },
                42
            ]
        }"#,
    );
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "json", &PropertyMap::default())
        .unwrap();

    let resource = loader.load_now(&ctx, Some(&manifest)).unwrap();
    assert!(matches!(resource.payload().as_deref(), Some(Payload::Document(_))));
    assert!(resource.size() > 0);

    let generated = loader.generated_loaders();
    assert_eq!(generated.len(), 2);
    assert_eq!(generated[0].suffix(), "png");
    assert_eq!(generated[0].source_url().as_deref(), Some("file://x.png"));
    assert_eq!(generated[1].suffix(), "mp4");

    let image = generated[0].load_now(&ctx, None).unwrap();
    assert_eq!(image.dimensions(), Some((1, 1)));
}

#[test]
fn test_single_generated_loader() {
    let fx = Fixture::new();
    let manifest = fx.file("m.json", r#"{"loaders":[{"source":"file://x.png"}]}"#);
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "json", &PropertyMap::default())
        .unwrap();

    loader.load(&ctx, Some(&manifest), LoadMode::Sync);
    let generated = loader.generated_loaders();
    assert_eq!(generated.len(), 1);
    assert_eq!(generated[0].suffix(), "png");
}

#[test]
fn test_invalid_manifest() {
    let fx = Fixture::new();
    let manifest = fx.file("bad.json", "{ loaders: ");
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "json", &PropertyMap::default())
        .unwrap();

    assert!(loader.load_now(&ctx, Some(&manifest)).is_none());
    assert!(loader.generated_loaders().is_empty());
}

#[test]
fn test_video_load() {
    let fx = Fixture::new();
    let source = fx.file("clip.mp4", "....");
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "mp4", &PropertyMap::default())
        .unwrap();

    let resource = loader.load_now(&ctx, Some(&source)).unwrap();
    assert_eq!(resource.state(), ResourceState::Loaded);
    assert_eq!(resource.size(), 0);

    let expected = MediaUrl::File(fx.dir.path().canonicalize().unwrap().join("clip.mp4"));
    let video = loader.downcast_ref::<VideoLoader>().unwrap();
    assert_eq!(video.current_media(), Some(expected.clone()));
    match resource.payload().as_deref() {
        Some(Payload::Media(url)) => assert_eq!(url, &expected),
        other => panic!("unexpected payload: {:?}", other),
    }

    loader.unload(&ctx, LoadMode::Sync);
    assert_eq!(video.current_media(), None);
    assert!(loader.load_now(&ctx, Some("missing.mp4")).is_none());
}

#[test]
fn test_bundled_video() {
    let fx = Fixture::new();
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("qrc", "mp4", &PropertyMap::default())
        .unwrap();

    let resource = loader.load_now(&ctx, Some("qrc:/media/intro.mp4")).unwrap();
    match resource.payload().as_deref() {
        Some(Payload::Media(url)) => assert_eq!(url.to_string(), "qrc:/media/intro.mp4"),
        other => panic!("unexpected payload: {:?}", other),
    };
}

#[test]
fn test_qml_load() {
    let fx = Fixture::new();
    let source = fx.file("ui/Main.qml", "Item {}");
    let ctx = fx.context();
    let loader = ctx
        .registration()
        .create_loader("file", "qml", &PropertyMap::default())
        .unwrap();

    let resource = loader.load_now(&ctx, Some(&source)).unwrap();
    assert_eq!(resource.size(), 7);
    match resource.payload().as_deref() {
        Some(Payload::Text(text)) => assert_eq!(text, "Item {}"),
        other => panic!("unexpected payload: {:?}", other),
    };
}
