
    use super::*;
    use crate::selector::Selector;
    use crate::snapshot::NodeSnapshot;

    fn chat_snapshot(text: &str) -> PageSnapshot {
        PageSnapshot::new(
            NodeSnapshot::element("body").with_child(
                NodeSnapshot::element("textarea")
                    .with_attr("id", "prompt-textarea")
                    .with_value(text),
            ),
        )
        .with_url("https://chat.example.com/")
    }

    fn prompt(page: &Page) -> NodeId {
        let selector = Selector::parse("#prompt-textarea").unwrap();
        page.read(|tree| tree.query_selector(tree.document(), &selector))
            .unwrap()
    }

    fn deep_watch() -> MutationObserverInit {
        MutationObserverInit {
            child_list: true,
            attributes: true,
            attribute_filter: Some(vec!["contenteditable".to_string(), "placeholder".to_string()]),
            character_data: true,
            subtree: true,
        }
    }

    #[test]
    fn test_from_snapshot() {
        let page = Page::from_snapshot(&chat_snapshot("hi")).unwrap();
        assert_eq!(page.url().as_deref(), Some("https://chat.example.com/"));
        let field = prompt(&page);
        assert_eq!(page.read(|t| t.value(field)).as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_observer_receives_one_batch_per_mutate() {
        let page = Page::from_snapshot(&chat_snapshot("")).unwrap();
        let mut stream = page.observe(page.document(), deep_watch());
        let field = prompt(&page);

        page.mutate(|tree| {
            tree.set_attribute(field, "placeholder", "Message")?;
            tree.set_attribute(field, "contenteditable", "false")?;
            Ok(())
        })
        .unwrap();

        let batch = stream.recv().await.unwrap();
        assert_eq!(batch.len(), 2);
        assert!(stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_filtered_attributes_not_delivered() {
        let page = Page::from_snapshot(&chat_snapshot("")).unwrap();
        let mut stream = page.observe(page.document(), deep_watch());
        let field = prompt(&page);

        page.mutate(|tree| tree.set_attribute(field, "style", "color: red"))
            .unwrap();

        assert!(stream.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_set_value_is_invisible_to_observers() {
        let page = Page::from_snapshot(&chat_snapshot("")).unwrap();
        let mut stream = page.observe(page.document(), deep_watch());
        let field = prompt(&page);

        page.mutate(|tree| tree.set_value(field, "typed")).unwrap();

        assert!(stream.try_recv().is_err());
        assert_eq!(page.read(|t| t.value(field)).as_deref(), Some("typed"));
    }

    #[tokio::test]
    async fn test_dropped_stream_disconnects() {
        let page = Page::new();
        let stream = page.observe(page.document(), deep_watch());
        assert_eq!(page.observer_count(), 1);
        drop(stream);
        assert_eq!(page.observer_count(), 0);
    }

    #[tokio::test]
    async fn test_interaction_events() {
        let page = Page::from_snapshot(&chat_snapshot("")).unwrap();
        let mut events = page.subscribe_interactions();
        let field = prompt(&page);

        page.type_into(field, "hello").unwrap();

        let input = events.recv().await.unwrap();
        assert_eq!(input.kind, InteractionKind::Input);
        assert_eq!(input.target, field);
        assert_eq!(input.target_tag, "textarea");
        assert!(!input.target_editable);
        let keyup = events.recv().await.unwrap();
        assert_eq!(keyup.kind, InteractionKind::KeyUp);
    }

    #[test]
    fn test_dispatch_to_stale_node_fails() {
        let page = Page::from_snapshot(&chat_snapshot("")).unwrap();
        let field = prompt(&page);
        page.mutate(|tree| tree.remove(field)).unwrap();
        assert!(matches!(page.dispatch_input(field), Err(DomError::StaleNode(_))));
    }

    #[tokio::test]
    async fn test_reconcile_delivers_records_and_updates_url() {
        let page = Page::from_snapshot(&chat_snapshot("a")).unwrap();
        let mut stream = page.observe(page.document(), deep_watch());
        let before = prompt(&page);

        let replaced = PageSnapshot::new(
            NodeSnapshot::element("body").with_child(
                NodeSnapshot::element("div")
                    .with_attr("id", "prompt-textarea")
                    .with_attr("contenteditable", "true")
                    .with_text("b"),
            ),
        )
        .with_url("https://chat.example.com/c/1");
        page.reconcile(&replaced).unwrap();

        let batch = stream.recv().await.unwrap();
        assert!(batch.iter().any(|r| r.is_child_list()));
        assert!(!page.read(|t| t.is_alive(before)));
        assert_eq!(page.url().as_deref(), Some("https://chat.example.com/c/1"));
    }

    #[test]
    fn test_snapshot_reflects_live_value() {
        let page = Page::from_snapshot(&chat_snapshot("")).unwrap();
        let field = prompt(&page);
        page.mutate(|tree| tree.set_value(field, "live")).unwrap();

        let snapshot = page.snapshot().unwrap();
        assert_eq!(snapshot.root.children[0].value.as_deref(), Some("live"));
    }
