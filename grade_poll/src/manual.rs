/*!

This is the long-form manual for `grade_poll` and `starchaser`.

## Grade polls

Every route page of the guidebook site shows a poll with one bar per
sub-grade, from the hardest to the easiest:

| bar key           | label       | votes |
|-------------------|-------------|-------|
| `37hard,High 6b+` | `High 6b+`  | 0     |
| `37,Mid 6b+`      | `Mid 6b+`   | 1     |
| `37easy,Low 6b+`  | `Low 6b+`   | 0     |
| `36hard,High 6b`  | `High 6b`   | 0     |
| `36,Mid 6b`       | `Mid 6b`    | 3     |
| `36easy,Low 6b`   | `Low 6b`    | 1     |
| `35hard,High 6a+` | `High 6a+`  | 1     |
| `35,Mid 6a+`      | `Mid 6a+`   | 0     |
| `35easy,Low 6a+`  | `Low 6a+`   | 0     |

The key is the grade code, followed by `hard` for the High bar or `easy` for
the Low bar, a comma and the label. Grade codes decrease as the routes get
easier.

The consensus is the bar at the weighted mean position. In the poll above,
the positions of the votes are 2, 5, 5, 5, 6 and 7, the mean is 5 and the
consensus is `Mid 6b`, code `36`. Means are rounded half to even: 2.5 goes to
position 2 and 3.5 to position 4.

## Poll difference

`poll_diff = guidebook score - (poll score + modifier)`, where the modifier
is `0.33` for a Low or High consensus and `0` for a Mid one. A positive
difference means that the guidebook grade is harder than the poll: the route
is soft. `-0.01` marks a route without a usable comparison:
* there is no poll, its columns do not line up, or nobody voted; the poll
  grade is then `Bad poll data`.
A poll with invalid votes (negative or non-integer counts, repeated keys) is
an error: `starchaser` leaves the route out of the table.
* the consensus code is not a grade of the route's grading scale; the poll
  grade is kept.

## Sorting poll grades

Poll grade labels sort by grade, then Low < Mid < High. Everything else
(`No votes`, `Bad poll data`, `project`, `?`) comes after the grades. A label
with a grade but an unknown modifier (`Hard 6b`) is an error, and the grade
summary of `starchaser` leaves it out.

## Input formats for `starchaser`

### `snapshot`

A JSON file with the guidebook and all its crags:

```json
{
  "guidebook": "Dorset",
  "crags": [{
    "name": "Winspit", "url": "https://example.org/logbook/crags/winspit-1/",
    "rocktype": "Limestone", "aspect": "S",
    "grade_list": {"3": {"36": {"name": "6b", "score": 36}}},
    "buttress_data": {"10": {"name": "Main Wall", "meta": {"approach_time": 5}}},
    "climb_symbols": {"1": {"name": "Bolts"}},
    "climbs": [{
      "name": "Gallows", "slug": "gallows-1", "grade": 36, "gradetype": 3,
      "stars": 2, "logs": 120, "desc": "Steep.", "symbols": [1], "buttress_id": 10,
      "poll": {"votes": [["36hard", "0"], ["36", "3"]], "grade_names": ["High 6b", "Mid 6b"]}
    }]
  }]
}
```

### `crag_script`

The body of the script element of a crag page, which declares the variables
`cragId`, `table_data`, `grade_list`, `buttress_data` and `climb_symbols`,
one per line. The polls are given in a separate JSON file that maps the slug
of every climb to its poll. The crag name, URL, rock type and aspect come from
the source configuration.

*/
