pub mod core;
pub mod index;
pub mod query;
pub mod postlist;
pub mod scoring;
pub mod matcher;

/*
┌─────────────────────────────────────────────────────────────────────────────┐
│                          MATCHCORE ARCHITECTURE                             │
└─────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── QUERY SIDE ─────────────────────────────────┐
│                                                                             │
│  QueryNode (query::ast)          expression tree from the parser/caller     │
│       │                                                                     │
│       ▼                                                                     │
│  QueryOptimiser (matcher::optimiser)                                        │
│   • dispatches per operator, threading the weight factor                    │
│   • AND family  → left-linear flatten + deferred positional filters         │
│   • OR family   → elite-set pruning + Huffman build by termfreq_est         │
│   • SYNONYM     → unweighted OR tree wrapped with a group weight            │
│       │                                                                     │
│       ▼                                                                     │
│  PostList tree (postlist::*)     document iterators with scoring hooks      │
│                                                                             │
└─────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────── SUPPORT CAST ────────────────────────────────┐
│                                                                             │
│  CollectionStats (matcher::stats)   per-collection term statistics,         │
│                                     merged shard-wise with +=               │
│  LocalSubMatch (matcher::submatch)  leaf factory: postings + Bm25Weight     │
│  Database (core::database)          read surface: capabilities + bounds     │
│  MemoryDatabase (index::memory)     in-memory sub-database implementation   │
│  MatchNotifier (matcher::notifier)  weight-bound change signal              │
│                                                                             │
└─────────────────────────────────────────────────────────────────────────────┘
*/
